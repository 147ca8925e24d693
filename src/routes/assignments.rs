use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::capacity::{self, DateWindow, MAX_ALLOCATED_HOURS};
use crate::db;
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{AssignmentDetail, AssignmentStatus, CapacityOverview};
use crate::routes::MessageResponse;
use crate::state::SharedState;
use crate::validate::{double_option, optional_text, Validator};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub user_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub status: Option<AssignmentStatus>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignment {
    pub user_id: String,
    pub project_id: String,
    pub allocated_hours: i32,
    pub start_date: String,
    pub end_date: Option<String>,
    pub notes: Option<String>,
}

/// Absent fields are left untouched; `endDate: null` makes the assignment open-ended.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignment {
    pub allocated_hours: Option<i32>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<String>>,
    pub status: Option<AssignmentStatus>,
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct AssignmentsResponse {
    pub assignments: Vec<AssignmentDetail>,
}

#[derive(Serialize)]
pub struct AssignmentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub assignment: AssignmentDetail,
}

#[derive(Serialize)]
pub struct CapacityResponse {
    pub capacity: CapacityOverview,
}

/// Hours `user_id` already has on ACTIVE assignments overlapping `window`,
/// not counting `exclude`.
async fn overlapping_allocation(
    conn: &mut PgConnection,
    user_id: Uuid,
    window: DateWindow,
    exclude: Option<Uuid>,
) -> Result<i32, AppError> {
    let active = db::assignments::active_for_user(&mut *conn, user_id).await?;
    Ok(capacity::total_allocated(
        active
            .iter()
            .filter(|a| Some(a.id) != exclude && a.window().overlaps(&window))
            .map(|a| a.allocated_hours),
    ))
}

async fn load_detail(state: &SharedState, id: Uuid) -> Result<AssignmentDetail, AppError> {
    db::assignments::find_detailed(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<AssignmentsResponse>, AppError> {
    let filter = db::assignments::ListFilter {
        user_id: params.user_id,
        project_id: params.project_id,
        status: params.status,
    };
    let assignments = db::assignments::list_detailed(&state.pool, &filter).await?;
    Ok(Json(AssignmentsResponse { assignments }))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssignmentResponse>, AppError> {
    Ok(Json(AssignmentResponse {
        message: None,
        assignment: load_detail(&state, id).await?,
    }))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateAssignment>,
) -> Result<(StatusCode, Json<AssignmentResponse>), AppError> {
    auth.require_manager()?;

    let mut v = Validator::new();
    let user_id = v.uuid("userId", &req.user_id);
    let project_id = v.uuid("projectId", &req.project_id);
    let hours = v.int_range("allocatedHours", req.allocated_hours, 1, MAX_ALLOCATED_HOURS);
    let start_date = v.date("startDate", &req.start_date);
    let end_date = v.optional_date("endDate", req.end_date.as_deref());
    v.date_order(start_date, end_date);
    v.finish()?;
    let (Some(user_id), Some(project_id), Some(start_date)) = (user_id, project_id, start_date)
    else {
        return Err(AppError::BadRequest("Invalid assignment".to_string()));
    };

    let mut tx = state.pool.begin().await?;

    let user = db::users::lock_by_id(&mut *tx, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    db::projects::find_by_id(&mut *tx, project_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    let window = DateWindow::requested(start_date, end_date);
    let current = overlapping_allocation(&mut tx, user.id, window, None).await?;
    if let Err(report) = capacity::check(user.hourly_capacity, current, hours) {
        tracing::warn!(
            user_id = %user.id,
            current = report.current_allocation,
            requested = report.requested_hours,
            capacity = report.total_capacity,
            "Assignment rejected: capacity exceeded"
        );
        return Err(AppError::CapacityExceeded(report));
    }

    let notes = optional_text(req.notes);
    let assignment = db::assignments::create(
        &mut *tx,
        &db::assignments::NewAssignment {
            user_id,
            project_id,
            allocated_hours: hours,
            start_date,
            end_date,
            notes: notes.as_deref(),
        },
    )
    .await?;

    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "assignment.created",
        "assignment",
        Some(assignment.id),
        Some(serde_json::json!({ "allocatedHours": hours, "userId": user_id })),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse {
            message: Some("Assignment created successfully".to_string()),
            assignment: load_detail(&state, assignment.id).await?,
        }),
    ))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateAssignment>,
) -> Result<Json<AssignmentResponse>, AppError> {
    auth.require_manager()?;

    let mut tx = state.pool.begin().await?;

    let mut assignment = db::assignments::lock_by_id(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;
    let was_active = assignment.status == AssignmentStatus::Active;

    let mut v = Validator::new();
    if let Some(hours) = req.allocated_hours {
        assignment.allocated_hours =
            v.int_range("allocatedHours", hours, 1, MAX_ALLOCATED_HOURS);
    }
    if let Some(start) = &req.start_date {
        if let Some(date) = v.date("startDate", start) {
            assignment.start_date = date;
        }
    }
    if let Some(end) = &req.end_date {
        assignment.end_date = v.optional_date("endDate", end.as_deref());
    }
    v.date_order(Some(assignment.start_date), assignment.end_date);
    v.finish()?;

    if let Some(status) = req.status {
        assignment.status = status;
    }
    if req.notes.is_some() {
        assignment.notes = optional_text(req.notes);
    }

    let allocation_changed = req.allocated_hours.is_some()
        || req.start_date.is_some()
        || req.end_date.is_some()
        || !was_active;
    if assignment.status == AssignmentStatus::Active && allocation_changed {
        let requested = DateWindow::requested(assignment.start_date, assignment.end_date);
        let user = db::users::lock_by_id(&mut *tx, assignment.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let current =
            overlapping_allocation(&mut tx, user.id, requested, Some(assignment.id))
                .await?;
        if let Err(report) =
            capacity::check(user.hourly_capacity, current, assignment.allocated_hours)
        {
            tracing::warn!(
                assignment_id = %assignment.id,
                user_id = %user.id,
                "Assignment update rejected: capacity exceeded"
            );
            return Err(AppError::CapacityExceeded(report));
        }
    }

    let assignment = db::assignments::update(&mut *tx, &assignment).await?;
    tx.commit().await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "assignment.updated",
        "assignment",
        Some(assignment.id),
        None,
    )
    .await;

    Ok(Json(AssignmentResponse {
        message: Some("Assignment updated successfully".to_string()),
        assignment: load_detail(&state, assignment.id).await?,
    }))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_manager()?;

    if !db::assignments::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Assignment not found".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "assignment.deleted",
        "assignment",
        Some(id),
        None,
    )
    .await;

    Ok(Json(MessageResponse::new("Assignment deleted successfully")))
}

pub async fn user_capacity(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<CapacityResponse>, AppError> {
    let user = db::users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let assignments = db::assignments::active_with_projects(&state.pool, user.id).await?;
    let allocated = capacity::total_allocated(
        assignments.iter().map(|a| a.assignment.allocated_hours),
    );
    let total_capacity = capacity::effective_capacity(user.hourly_capacity);

    Ok(Json(CapacityResponse {
        capacity: CapacityOverview {
            user_id: user.id,
            user_name: user.name,
            total_capacity,
            allocated_hours: allocated,
            available_hours: total_capacity - allocated,
            utilization_percentage: capacity::utilization_percent(allocated, total_capacity),
            assignments,
        },
    }))
}
