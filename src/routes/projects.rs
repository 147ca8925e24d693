use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{Priority, ProjectDetail, ProjectStatus};
use crate::routes::MessageResponse;
use crate::state::SharedState;
use crate::validate::{double_option, optional_text, Validator};

#[derive(Deserialize)]
pub struct ListParams {
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<ProjectStatus>,
}

/// Absent fields are left untouched; `endDate: null` clears the end date.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub status: Option<ProjectStatus>,
}

#[derive(Serialize)]
pub struct ProjectsResponse {
    pub projects: Vec<ProjectDetail>,
}

#[derive(Serialize)]
pub struct ProjectResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub project: ProjectDetail,
}

async fn load_detail(state: &SharedState, id: Uuid) -> Result<ProjectDetail, AppError> {
    db::projects::find_detailed(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ProjectsResponse>, AppError> {
    let filter = db::projects::ListFilter {
        status: params.status,
        priority: params.priority,
    };
    let projects = db::projects::list_detailed(&state.pool, &filter).await?;
    Ok(Json(ProjectsResponse { projects }))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectResponse>, AppError> {
    Ok(Json(ProjectResponse {
        message: None,
        project: load_detail(&state, id).await?,
    }))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateProject>,
) -> Result<(StatusCode, Json<ProjectResponse>), AppError> {
    auth.require_manager()?;

    let mut v = Validator::new();
    let name = v.required_text("name", &req.name);
    let start_date = v.date("startDate", &req.start_date);
    let end_date = v.optional_date("endDate", req.end_date.as_deref());
    v.date_order(start_date, end_date);
    v.finish()?;
    let Some(start_date) = start_date else {
        return Err(AppError::BadRequest("startDate is required".to_string()));
    };

    let description = optional_text(req.description);
    let project = db::projects::create(
        &state.pool,
        &db::projects::NewProject {
            name: &name,
            description: description.as_deref(),
            start_date,
            end_date,
            priority: req.priority.unwrap_or(Priority::Medium),
            status: req.status.unwrap_or(ProjectStatus::Planning),
            manager_id: auth.user_id,
        },
    )
    .await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "project.created",
        "project",
        Some(project.id),
        None,
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ProjectResponse {
            message: Some("Project created successfully".to_string()),
            project: load_detail(&state, project.id).await?,
        }),
    ))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProject>,
) -> Result<Json<ProjectResponse>, AppError> {
    auth.require_manager()?;

    let mut project = db::projects::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

    let mut v = Validator::new();
    if let Some(name) = &req.name {
        project.name = v.required_text("name", name);
    }
    if let Some(start) = &req.start_date {
        if let Some(date) = v.date("startDate", start) {
            project.start_date = date;
        }
    }
    if let Some(end) = &req.end_date {
        project.end_date = v.optional_date("endDate", end.as_deref());
    }
    v.date_order(Some(project.start_date), project.end_date);
    v.finish()?;

    if req.description.is_some() {
        project.description = optional_text(req.description);
    }
    if let Some(priority) = req.priority {
        project.priority = priority;
    }
    if let Some(status) = req.status {
        project.status = status;
    }

    let project = db::projects::update(&state.pool, &project).await?;

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "project.updated",
        "project",
        Some(project.id),
        None,
    )
    .await;

    Ok(Json(ProjectResponse {
        message: Some("Project updated successfully".to_string()),
        project: load_detail(&state, project.id).await?,
    }))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    auth.require_manager()?;

    if !db::projects::delete(&state.pool, id).await? {
        return Err(AppError::NotFound("Project not found".to_string()));
    }

    audit::log_event(
        &state.pool,
        Some(auth.user_id),
        "project.deleted",
        "project",
        Some(id),
        None,
    )
    .await;

    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
