use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::extract::{Json, Query};
use crate::models::AuditEvent;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Serialize)]
pub struct AuditResponse {
    pub events: Vec<AuditEvent>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(params): Query<ListParams>,
) -> Result<Json<AuditResponse>, AppError> {
    auth.require_manager()?;

    let limit = params.limit.unwrap_or(50).clamp(1, 200);
    let offset = params.offset.unwrap_or(0).max(0);
    let events = db::audit::list(&state.pool, limit, offset).await?;

    Ok(Json(AuditResponse {
        events,
        limit,
        offset,
    }))
}
