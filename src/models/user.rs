use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Manager,
    Engineer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "seniority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub role: Role,
    pub skills: Option<String>,
    pub seniority: Option<Seniority>,
    pub hourly_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An active assignment as listed under a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAllocation {
    pub id: Uuid,
    pub allocated_hours: i32,
    pub project: ProjectName,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectName {
    pub id: Uuid,
    pub name: String,
}

/// A user together with their current ACTIVE assignments.
#[derive(Debug, Clone, Serialize)]
pub struct UserWithAllocations {
    #[serde(flatten)]
    pub user: User,
    pub assignments: Vec<ActiveAllocation>,
}
