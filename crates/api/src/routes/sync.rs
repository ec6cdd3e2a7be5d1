//! Sync action endpoint
//!
//! A single POST endpoint dispatches on the `action` field of the JSON body,
//! mirroring the shape of the club's other action-style endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chorale_domain::{ChoraleError, Member, SyncStats};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::ApiError;
use crate::context::AppContext;

pub fn router() -> Router<AppContext> {
    Router::new().route("/", post(dispatch_action)).route("/health", get(health))
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(rename = "superAdminToken")]
    pub super_admin_token: Option<String>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub stats: SyncStats,
}

/// POST / - action dispatch
///
/// Any body rejection (bad syntax, missing fields, wrong content type) maps
/// to 400 instead of axum's default rejection statuses.
#[instrument(skip_all)]
async fn dispatch_action(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    body: Result<Json<ActionRequest>, JsonRejection>,
) -> Result<Json<SyncResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let caller = authenticate(&ctx, &headers, request.super_admin_token.as_deref()).await?;

    match request.action.as_str() {
        "full_sync" => {
            info!(member_id = %caller.id, "full sync requested");
            let stats = ctx.sync.full_sync(&caller).await?;
            Ok(Json(SyncResponse { success: true, stats }))
        }
        _ => Err(ApiError::bad_request("Unknown action")),
    }
}

/// Resolve the caller from the super-admin override token or a Bearer token.
async fn authenticate(
    ctx: &AppContext,
    headers: &HeaderMap,
    super_admin_token: Option<&str>,
) -> Result<Member, ApiError> {
    if let (Some(expected), Some(provided)) = (&ctx.super_admin_token, super_admin_token) {
        if expected == provided {
            return ctx
                .members
                .find_super_admin()
                .await
                .map_err(ApiError::from)?
                .ok_or_else(|| ChoraleError::Auth("No super admin on file".to_string()).into());
        }
    }

    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::from(ChoraleError::Auth("Missing credentials".to_string())))?;

    ctx.members
        .find_by_api_token(token)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ChoraleError::Auth("Invalid credentials".to_string()).into())
}

/// GET /health - liveness and database connectivity probe
async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    match ctx.db.health_check() {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "status": "ok" }))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "degraded", "error": e.to_string() })),
        ),
    }
}
