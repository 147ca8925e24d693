use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Assignment, Priority, ProjectStatus, Role, Seniority};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub overview: Overview,
    pub project_status_distribution: Vec<StatusCount>,
    pub project_priority_distribution: Vec<PriorityCount>,
    pub user_capacity_overview: Vec<UserCapacity>,
    pub over_allocated_users: Vec<UserCapacity>,
    pub under_utilized_users: Vec<UserCapacity>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_projects: i64,
    pub total_users: i64,
    pub total_assignments: i64,
    pub avg_utilization: i32,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct StatusCount {
    pub status: ProjectStatus,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCapacity {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub capacity: i32,
    pub allocated: i32,
    pub available: i32,
    pub utilization: i32,
}

/// Per-user sums of ACTIVE allocations, as read from SQL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserAllocationRow {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
    pub hourly_capacity: i32,
    pub allocated: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadUser {
    pub id: Uuid,
    pub name: String,
    pub seniority: Option<Seniority>,
    pub hourly_capacity: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadProject {
    pub id: Uuid,
    pub name: String,
    pub priority: Priority,
    pub allocated_hours: i32,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workload {
    pub user: WorkloadUser,
    pub total_hours: i32,
    pub projects: Vec<WorkloadProject>,
}

/// One ACTIVE assignment joined with its user and project, as read from SQL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkloadRow {
    pub user_id: Uuid,
    pub user_name: String,
    pub user_seniority: Option<Seniority>,
    pub user_hourly_capacity: i32,
    pub project_id: Uuid,
    pub project_name: String,
    pub project_priority: Priority,
    pub project_end_date: Option<NaiveDate>,
    pub allocated_hours: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityProject {
    pub id: Uuid,
    pub name: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapacityAssignment {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub project: CapacityProject,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityOverview {
    pub user_id: Uuid,
    pub user_name: String,
    pub total_capacity: i32,
    pub allocated_hours: i32,
    pub available_hours: i32,
    pub utilization_percentage: i32,
    pub assignments: Vec<CapacityAssignment>,
}
