use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Assignment, AssignmentDetail, AssignmentDetailRow, AssignmentStatus, CapacityAssignment,
    CapacityProject, Priority,
};

pub struct NewAssignment<'a> {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub allocated_hours: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Default)]
pub struct ListFilter {
    pub user_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub status: Option<AssignmentStatus>,
}

/// An ACTIVE assignment reduced to what a user listing shows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActiveAllocationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub allocated_hours: i32,
    pub project_id: Uuid,
    pub project_name: String,
}

#[derive(sqlx::FromRow)]
struct CapacityAssignmentRow {
    #[sqlx(flatten)]
    assignment: Assignment,
    project_name: String,
    project_priority: Priority,
}

const SELECT_DETAIL: &str = "SELECT a.*,
            u.name AS user_name, u.email AS user_email, u.seniority AS user_seniority,
            u.hourly_capacity AS user_hourly_capacity,
            p.name AS project_name, p.status AS project_status, p.priority AS project_priority
     FROM assignments a
     JOIN users u ON u.id = a.user_id
     JOIN projects p ON p.id = a.project_id";

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    assignment: &NewAssignment<'_>,
) -> Result<Assignment, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(
        "INSERT INTO assignments (user_id, project_id, allocated_hours, start_date, end_date, notes)
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(assignment.user_id)
    .bind(assignment.project_id)
    .bind(assignment.allocated_hours)
    .bind(assignment.start_date)
    .bind(assignment.end_date)
    .bind(assignment.notes)
    .fetch_one(executor)
    .await
}

/// Read an assignment and lock its row for the rest of the transaction, so
/// concurrent partial updates apply one after the other.
pub async fn lock_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_detailed(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<AssignmentDetail>, sqlx::Error> {
    let row = sqlx::query_as::<_, AssignmentDetailRow>(&format!("{SELECT_DETAIL} WHERE a.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(AssignmentDetail::from))
}

pub async fn list_detailed(
    pool: &PgPool,
    filter: &ListFilter,
) -> Result<Vec<AssignmentDetail>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AssignmentDetailRow>(&format!(
        "{SELECT_DETAIL}
         WHERE ($1::uuid IS NULL OR a.user_id = $1)
           AND ($2::uuid IS NULL OR a.project_id = $2)
           AND ($3::assignment_status IS NULL OR a.status = $3)
         ORDER BY a.created_at DESC"
    ))
    .bind(filter.user_id)
    .bind(filter.project_id)
    .bind(filter.status)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(AssignmentDetail::from).collect())
}

/// Every ACTIVE assignment of a user, regardless of dates.
pub async fn active_for_user<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(
        "SELECT * FROM assignments WHERE user_id = $1 AND status = 'ACTIVE'
         ORDER BY start_date ASC",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// ACTIVE assignments for the given users (all users when `None`).
pub async fn active_allocations(
    pool: &PgPool,
    user_id: Option<Uuid>,
) -> Result<Vec<ActiveAllocationRow>, sqlx::Error> {
    sqlx::query_as::<_, ActiveAllocationRow>(
        "SELECT a.id, a.user_id, a.allocated_hours, p.id AS project_id, p.name AS project_name
         FROM assignments a
         JOIN projects p ON p.id = a.project_id
         WHERE a.status = 'ACTIVE' AND ($1::uuid IS NULL OR a.user_id = $1)
         ORDER BY a.start_date ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn active_with_projects(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CapacityAssignment>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CapacityAssignmentRow>(
        "SELECT a.*, p.name AS project_name, p.priority AS project_priority
         FROM assignments a
         JOIN projects p ON p.id = a.project_id
         WHERE a.user_id = $1 AND a.status = 'ACTIVE'
         ORDER BY a.start_date ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| CapacityAssignment {
            project: CapacityProject {
                id: row.assignment.project_id,
                name: row.project_name,
                priority: row.project_priority,
            },
            assignment: row.assignment,
        })
        .collect())
}

/// Persist the editable fields of `assignment`.
pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    assignment: &Assignment,
) -> Result<Assignment, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(
        "UPDATE assignments
         SET allocated_hours = $2, start_date = $3, end_date = $4, status = $5, notes = $6,
             updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(assignment.id)
    .bind(assignment.allocated_hours)
    .bind(assignment.start_date)
    .bind(assignment.end_date)
    .bind(assignment.status)
    .bind(&assignment.notes)
    .fetch_one(executor)
    .await
}

/// Returns `false` when no row matched.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM assignments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
