use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::capacity::{DEFAULT_CAPACITY, MAX_CAPACITY};
use crate::db;
use crate::db::assignments::ActiveAllocationRow;
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{ActiveAllocation, ProjectName, Role, Seniority, User, UserWithAllocations};
use crate::routes::MessageResponse;
use crate::state::SharedState;
use crate::validate::{optional_text, Validator};

#[derive(Deserialize)]
pub struct ListParams {
    pub role: Option<Role>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Option<Role>,
    pub skills: Option<String>,
    pub seniority: Option<Seniority>,
    pub hourly_capacity: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub skills: Option<String>,
    pub seniority: Option<Seniority>,
    pub hourly_capacity: Option<i32>,
}

#[derive(Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserWithAllocations>,
}

#[derive(Serialize)]
pub struct UserResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: UserWithAllocations,
}

fn group_allocations(rows: Vec<ActiveAllocationRow>) -> HashMap<Uuid, Vec<ActiveAllocation>> {
    let mut by_user: HashMap<Uuid, Vec<ActiveAllocation>> = HashMap::new();
    for row in rows {
        by_user.entry(row.user_id).or_default().push(ActiveAllocation {
            id: row.id,
            allocated_hours: row.allocated_hours,
            project: ProjectName {
                id: row.project_id,
                name: row.project_name,
            },
        });
    }
    by_user
}

async fn with_allocations(state: &SharedState, user: User) -> Result<UserWithAllocations, AppError> {
    let rows = db::assignments::active_allocations(&state.pool, Some(user.id)).await?;
    let assignments = group_allocations(rows).remove(&user.id).unwrap_or_default();
    Ok(UserWithAllocations { user, assignments })
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<UsersResponse>, AppError> {
    let users = db::users::list(&state.pool, params.role).await?;
    let mut allocations =
        group_allocations(db::assignments::active_allocations(&state.pool, None).await?);

    let users = users
        .into_iter()
        .map(|user| {
            let assignments = allocations.remove(&user.id).unwrap_or_default();
            UserWithAllocations { user, assignments }
        })
        .collect();

    Ok(Json(UsersResponse { users }))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse {
        message: None,
        user: with_allocations(&state, user).await?,
    }))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    auth.require_manager()?;

    let mut v = Validator::new();
    let email = v.email("email", &req.email);
    v.password("password", &req.password);
    let name = v.required_text("name", &req.name);
    let hourly_capacity = v.int_range(
        "hourlyCapacity",
        req.hourly_capacity.unwrap_or(DEFAULT_CAPACITY),
        1,
        MAX_CAPACITY,
    );
    v.finish()?;

    let pw_hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let skills = optional_text(req.skills);

    let user = db::users::create(
        &state.pool,
        &db::users::NewUser {
            email: &email,
            password_hash: &pw_hash,
            name: &name,
            role: req.role.unwrap_or(Role::Engineer),
            skills: skills.as_deref(),
            seniority: req.seniority,
            hourly_capacity,
        },
    )
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "A user with this email already exists"))?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "user.created",
        "user",
        Some(user.id),
        Some(serde_json::json!({ "role": user.role })),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            message: Some("User created successfully".to_string()),
            user: UserWithAllocations {
                user,
                assignments: Vec::new(),
            },
        }),
    ))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUser>,
) -> Result<Json<UserResponse>, AppError> {
    auth.require_self_or_manager(id)?;
    if req.role.is_some() && !auth.is_manager() {
        return Err(AppError::Forbidden(
            "Only managers can change roles".to_string(),
        ));
    }

    let mut user = db::users::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut v = Validator::new();
    if let Some(name) = &req.name {
        user.name = v.required_text("name", name);
    }
    if let Some(capacity) = req.hourly_capacity {
        user.hourly_capacity = v.int_range("hourlyCapacity", capacity, 1, MAX_CAPACITY);
    }
    v.finish()?;

    if let Some(role) = req.role {
        user.role = role;
    }
    if req.skills.is_some() {
        user.skills = optional_text(req.skills);
    }
    if let Some(seniority) = req.seniority {
        user.seniority = Some(seniority);
    }

    let user = db::users::update_profile(&state.pool, &user).await?;

    audit::log_event(&state.pool, Some(auth.user_id), "user.updated", "user", Some(id), None).await;

    Ok(Json(UserResponse {
        message: Some("User updated successfully".to_string()),
        user: with_allocations(&state, user).await?,
    }))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_manager()?;
    if id == auth.user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    // Managed projects block the delete at the foreign key.
    let deleted = db::users::delete(&state.pool, id).await.map_err(|e| {
        AppError::conflict_on_foreign_key(
            e,
            "User still manages projects; reassign or delete them first",
        )
    })?;
    if !deleted {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    audit::log_event(&state.pool, Some(auth.user_id), "user.deleted", "user", Some(id), None).await;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
