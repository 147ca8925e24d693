use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    AssigneeSummary, AssignmentStatus, ManagerSummary, Priority, Project, ProjectAssignment,
    ProjectDetail, ProjectStatus, Seniority,
};

pub struct NewProject<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub priority: Priority,
    pub status: ProjectStatus,
    pub manager_id: Uuid,
}

#[derive(Debug, Default)]
pub struct ListFilter {
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
}

#[derive(sqlx::FromRow)]
struct ProjectRow {
    #[sqlx(flatten)]
    project: Project,
    manager_name: String,
    manager_email: String,
}

#[derive(sqlx::FromRow)]
struct ProjectAssignmentRow {
    id: Uuid,
    project_id: Uuid,
    allocated_hours: i32,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: AssignmentStatus,
    notes: Option<String>,
    user_id: Uuid,
    user_name: String,
    user_email: String,
    user_seniority: Option<Seniority>,
}

const SELECT_WITH_MANAGER: &str = "SELECT p.*, m.name AS manager_name, m.email AS manager_email
     FROM projects p
     JOIN users m ON m.id = p.manager_id";

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    project: &NewProject<'_>,
) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "INSERT INTO projects (name, description, start_date, end_date, priority, status, manager_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
    )
    .bind(project.name)
    .bind(project.description)
    .bind(project.start_date)
    .bind(project.end_date)
    .bind(project.priority)
    .bind(project.status)
    .bind(project.manager_id)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Project>, sqlx::Error> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Projects with their manager and assignments, newest first.
pub async fn list_detailed(
    pool: &PgPool,
    filter: &ListFilter,
) -> Result<Vec<ProjectDetail>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "{SELECT_WITH_MANAGER}
         WHERE ($1::project_status IS NULL OR p.status = $1)
           AND ($2::project_priority IS NULL OR p.priority = $2)
         ORDER BY p.created_at DESC"
    ))
    .bind(filter.status)
    .bind(filter.priority)
    .fetch_all(pool)
    .await?;

    attach_assignments(pool, rows).await
}

pub async fn find_detailed(pool: &PgPool, id: Uuid) -> Result<Option<ProjectDetail>, sqlx::Error> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!("{SELECT_WITH_MANAGER} WHERE p.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => Ok(attach_assignments(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn attach_assignments(
    pool: &PgPool,
    rows: Vec<ProjectRow>,
) -> Result<Vec<ProjectDetail>, sqlx::Error> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.project.id).collect();

    let assignment_rows = sqlx::query_as::<_, ProjectAssignmentRow>(
        "SELECT a.id, a.project_id, a.allocated_hours, a.start_date, a.end_date, a.status, a.notes,
                u.id AS user_id, u.name AS user_name, u.email AS user_email,
                u.seniority AS user_seniority
         FROM assignments a
         JOIN users u ON u.id = a.user_id
         WHERE a.project_id = ANY($1)
         ORDER BY a.created_at DESC",
    )
    .bind(&ids[..])
    .fetch_all(pool)
    .await?;

    let mut by_project: HashMap<Uuid, Vec<ProjectAssignment>> = HashMap::new();
    for row in assignment_rows {
        by_project
            .entry(row.project_id)
            .or_default()
            .push(ProjectAssignment {
                id: row.id,
                allocated_hours: row.allocated_hours,
                start_date: row.start_date,
                end_date: row.end_date,
                status: row.status,
                notes: row.notes,
                user: AssigneeSummary {
                    id: row.user_id,
                    name: row.user_name,
                    email: row.user_email,
                    seniority: row.user_seniority,
                },
            });
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let manager = ManagerSummary {
                id: row.project.manager_id,
                name: row.manager_name,
                email: row.manager_email,
            };
            let assignments = by_project.remove(&row.project.id).unwrap_or_default();
            ProjectDetail {
                project: row.project,
                manager,
                assignments,
            }
        })
        .collect())
}

/// Persist the editable fields of `project`.
pub async fn update(pool: &PgPool, project: &Project) -> Result<Project, sqlx::Error> {
    sqlx::query_as::<_, Project>(
        "UPDATE projects
         SET name = $2, description = $3, start_date = $4, end_date = $5,
             priority = $6, status = $7, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(project.id)
    .bind(&project.name)
    .bind(&project.description)
    .bind(project.start_date)
    .bind(project.end_date)
    .bind(project.priority)
    .bind(project.status)
    .fetch_one(pool)
    .await
}

/// Returns `false` when no row matched.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
