use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capacity::DateWindow;
use crate::models::{Priority, ProjectStatus, Seniority};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "assignment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub allocated_hours: i32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub status: AssignmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.start_date, self.end_date)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub seniority: Option<Seniority>,
    pub hourly_capacity: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignedProject {
    pub id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub user: AssignedUser,
    pub project: AssignedProject,
}

/// Flat join of an assignment with its user and project, as read from SQL.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssignmentDetailRow {
    #[sqlx(flatten)]
    pub assignment: Assignment,
    pub user_name: String,
    pub user_email: String,
    pub user_seniority: Option<Seniority>,
    pub user_hourly_capacity: i32,
    pub project_name: String,
    pub project_status: ProjectStatus,
    pub project_priority: Priority,
}

impl From<AssignmentDetailRow> for AssignmentDetail {
    fn from(row: AssignmentDetailRow) -> Self {
        let user = AssignedUser {
            id: row.assignment.user_id,
            name: row.user_name,
            email: row.user_email,
            seniority: row.user_seniority,
            hourly_capacity: row.user_hourly_capacity,
        };
        let project = AssignedProject {
            id: row.assignment.project_id,
            name: row.project_name,
            status: row.project_status,
            priority: row.project_priority,
        };
        AssignmentDetail {
            assignment: row.assignment,
            user,
            project,
        }
    }
}
