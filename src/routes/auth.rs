use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims};
use crate::auth::password;
use crate::capacity::{DEFAULT_CAPACITY, MAX_CAPACITY};
use crate::config::RegistrationMode;
use crate::db;
use crate::error::AppError;
use crate::extract::Json;
use crate::middleware::audit;
use crate::models::{Role, Seniority, User};
use crate::routes::MessageResponse;
use crate::state::SharedState;
use crate::validate::{optional_text, Validator};

/// Advisory lock key serializing the bootstrap registration.
const REGISTRATION_LOCK: i64 = 0x4552_4d01;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Option<Role>,
    pub skills: Option<String>,
    pub seniority: Option<Seniority>,
    pub hourly_capacity: Option<i32>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: User,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
}

fn issue_token(state: &SharedState, user: &User) -> Result<String, AppError> {
    let claims = Claims::new(user.id, user.role, state.config.token_ttl_hours);
    encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)
}

pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
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

    let mut tx = state.pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(REGISTRATION_LOCK)
        .execute(&mut *tx)
        .await?;

    // The very first account always becomes a manager so the system can be administered.
    let is_bootstrap = db::users::count_all(&mut *tx).await? == 0;
    let role = if is_bootstrap {
        Role::Manager
    } else if state.config.registration == RegistrationMode::Closed {
        return Err(AppError::Forbidden(
            "Registration is disabled. Ask a manager to create your account.".to_string(),
        ));
    } else {
        req.role.unwrap_or(Role::Engineer)
    };

    let skills = optional_text(req.skills);
    let user = db::users::create(
        &mut *tx,
        &db::users::NewUser {
            email: &email,
            password_hash: &pw_hash,
            name: &name,
            role,
            skills: skills.as_deref(),
            seniority: req.seniority,
            hourly_capacity,
        },
    )
    .await
    .map_err(|e| AppError::conflict_on_unique(e, "A user with this email already exists"))?;

    tx.commit().await?;

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, role = ?user.role, bootstrap = is_bootstrap, "User registered");
    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.registered",
        "user",
        Some(user.id),
        None,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user,
        }),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();

    if let Err(retry_after) = state.login_limiter.check(&email) {
        tracing::warn!(retry_after, "Login rate limit hit");
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let Some(user) = db::users::find_by_email(&state.pool, &email).await? else {
        state.login_limiter.record_failure(&email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    };

    let valid = password::verify(&req.password, &user.password_hash).map_err(AppError::Internal)?;
    if !valid {
        state.login_limiter.record_failure(&email);
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }
    state.login_limiter.record_success(&email);

    let token = issue_token(&state, &user)?;

    tracing::info!(user_id = %user.id, "User logged in");
    audit::log_event(&state.pool, Some(user.id), "user.login", "user", Some(user.id), None).await;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user,
    }))
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<MeResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;
    Ok(Json(MeResponse { user }))
}

pub async fn change_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let mut v = Validator::new();
    v.password("newPassword", &req.new_password);
    v.finish()?;

    let user = db::users::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

    let valid = password::verify(&req.current_password, &user.password_hash)
        .map_err(AppError::Internal)?;
    if !valid {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password).map_err(AppError::Internal)?;
    db::users::update_password(&state.pool, user.id, &pw_hash).await?;

    audit::log_event(
        &state.pool,
        Some(user.id),
        "user.password_changed",
        "user",
        Some(user.id),
        None,
    )
    .await;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}
