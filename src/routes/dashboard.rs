use std::collections::HashMap;

use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::capacity::{self, OVER_ALLOCATED_ABOVE, UNDER_UTILIZED_BELOW};
use crate::db;
use crate::error::AppError;
use crate::extract::Json;
use crate::models::{
    Analytics, Overview, UserAllocationRow, UserCapacity, Workload, WorkloadProject, WorkloadRow,
    WorkloadUser,
};
use crate::state::SharedState;

#[derive(Serialize)]
pub struct AnalyticsResponse {
    pub analytics: Analytics,
}

#[derive(Serialize)]
pub struct WorkloadResponse {
    pub workload: Vec<Workload>,
}

fn user_capacity(row: UserAllocationRow) -> UserCapacity {
    let capacity = capacity::effective_capacity(row.hourly_capacity);
    let allocated = i32::try_from(row.allocated).unwrap_or(i32::MAX);
    UserCapacity {
        user_id: row.id,
        name: row.name,
        role: row.role,
        capacity,
        allocated,
        available: capacity - allocated,
        utilization: capacity::utilization_percent(allocated, capacity),
    }
}

/// Group assignment rows per user, keeping the order in which users first appear.
pub fn group_workload(rows: Vec<WorkloadRow>) -> Vec<Workload> {
    let mut workload: Vec<Workload> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.user_id).or_insert_with(|| {
            workload.push(Workload {
                user: WorkloadUser {
                    id: row.user_id,
                    name: row.user_name.clone(),
                    seniority: row.user_seniority,
                    hourly_capacity: row.user_hourly_capacity,
                },
                total_hours: 0,
                projects: Vec::new(),
            });
            workload.len() - 1
        });

        let entry = &mut workload[slot];
        entry.total_hours += row.allocated_hours;
        entry.projects.push(WorkloadProject {
            id: row.project_id,
            name: row.project_name,
            priority: row.project_priority,
            allocated_hours: row.allocated_hours,
            end_date: row.project_end_date,
        });
    }

    workload
}

pub async fn analytics(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let totals = db::dashboard::totals(&state.pool).await?;
    let project_status_distribution = db::dashboard::project_status_counts(&state.pool).await?;
    let project_priority_distribution =
        db::dashboard::project_priority_counts(&state.pool).await?;

    let user_capacity_overview: Vec<UserCapacity> = db::dashboard::user_allocations(&state.pool)
        .await?
        .into_iter()
        .map(user_capacity)
        .collect();

    let utilizations: Vec<i32> = user_capacity_overview.iter().map(|u| u.utilization).collect();

    let over_allocated_users = user_capacity_overview
        .iter()
        .filter(|u| u.utilization > OVER_ALLOCATED_ABOVE)
        .cloned()
        .collect();
    let under_utilized_users = user_capacity_overview
        .iter()
        .filter(|u| u.utilization < UNDER_UTILIZED_BELOW)
        .cloned()
        .collect();

    Ok(Json(AnalyticsResponse {
        analytics: Analytics {
            overview: Overview {
                total_projects: totals.projects,
                total_users: totals.users,
                total_assignments: totals.active_assignments,
                avg_utilization: capacity::average_utilization(&utilizations),
            },
            project_status_distribution,
            project_priority_distribution,
            user_capacity_overview,
            over_allocated_users,
            under_utilized_users,
        },
    }))
}

pub async fn workload(
    _auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<WorkloadResponse>, AppError> {
    let rows = db::dashboard::workload_rows(&state.pool).await?;
    Ok(Json(WorkloadResponse {
        workload: group_workload(rows),
    }))
}
