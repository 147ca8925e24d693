use sqlx::PgPool;

use crate::models::{PriorityCount, StatusCount, UserAllocationRow, WorkloadRow};

pub struct Totals {
    pub projects: i64,
    pub users: i64,
    pub active_assignments: i64,
}

pub async fn totals(pool: &PgPool) -> Result<Totals, sqlx::Error> {
    let (projects, users, active_assignments): (i64, i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM projects),
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM assignments WHERE status = 'ACTIVE')",
    )
    .fetch_one(pool)
    .await?;

    Ok(Totals {
        projects,
        users,
        active_assignments,
    })
}

pub async fn project_status_counts(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
    sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM projects GROUP BY status ORDER BY status",
    )
    .fetch_all(pool)
    .await
}

pub async fn project_priority_counts(pool: &PgPool) -> Result<Vec<PriorityCount>, sqlx::Error> {
    sqlx::query_as::<_, PriorityCount>(
        "SELECT priority, COUNT(*) AS count FROM projects GROUP BY priority ORDER BY priority",
    )
    .fetch_all(pool)
    .await
}

/// Every user with the sum of their ACTIVE allocations.
pub async fn user_allocations(pool: &PgPool) -> Result<Vec<UserAllocationRow>, sqlx::Error> {
    sqlx::query_as::<_, UserAllocationRow>(
        "SELECT u.id, u.name, u.role, u.hourly_capacity,
                COALESCE(SUM(a.allocated_hours), 0)::BIGINT AS allocated
         FROM users u
         LEFT JOIN assignments a ON a.user_id = u.id AND a.status = 'ACTIVE'
         GROUP BY u.id
         ORDER BY u.created_at DESC",
    )
    .fetch_all(pool)
    .await
}

/// ACTIVE assignments with user and project columns, earliest start first.
pub async fn workload_rows(pool: &PgPool) -> Result<Vec<WorkloadRow>, sqlx::Error> {
    sqlx::query_as::<_, WorkloadRow>(
        "SELECT u.id AS user_id, u.name AS user_name, u.seniority AS user_seniority,
                u.hourly_capacity AS user_hourly_capacity,
                p.id AS project_id, p.name AS project_name, p.priority AS project_priority,
                p.end_date AS project_end_date,
                a.allocated_hours
         FROM assignments a
         JOIN users u ON u.id = a.user_id
         JOIN projects p ON p.id = a.project_id
         WHERE a.status = 'ACTIVE'
         ORDER BY a.start_date ASC, a.created_at ASC",
    )
    .fetch_all(pool)
    .await
}
