use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;

use crate::document::EncodedDocument;
use crate::models::*;
use crate::workflow::{Controller, ControllerError};

type AppState = Arc<Controller>;
type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a controller error to a response.
///
/// Validation errors are returned as-is; everything else is logged and
/// reported with a message that carries no service internals.
fn controller_error(e: ControllerError) -> (StatusCode, String) {
    let status = match &e {
        ControllerError::EmptyInput
        | ControllerError::Document(_)
        | ControllerError::UnknownItem(_) => StatusCode::BAD_REQUEST,
        ControllerError::ServiceNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        ControllerError::Busy(_) => StatusCode::CONFLICT,
        ControllerError::Synthesis(_) => StatusCode::BAD_GATEWAY,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", e);
    } else {
        tracing::warn!("Rejected request: {}", e);
    }
    (status, e.to_string())
}

/// Run a workflow on its own task so it completes even if the client disconnects.
async fn run_detached<T, F>(work: F) -> Result<T, (StatusCode, String)>
where
    F: std::future::Future<Output = Result<T, ControllerError>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(work).await {
        Ok(result) => result.map_err(controller_error),
        Err(e) => {
            tracing::error!("Workflow task failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ))
        }
    }
}

// ============================================================
// Request Types
// ============================================================

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub document: Option<EncodedDocument>,
}

#[derive(Debug, Deserialize)]
pub struct StageRequest {
    /// An extracted question's `id`, or its text when it has none.
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub struct SetViewRequest {
    pub view: View,
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Session
// ============================================================

pub async fn get_session(State(controller): State<AppState>) -> Json<SessionSnapshot> {
    Json(controller.snapshot())
}

pub async fn set_view(
    State(controller): State<AppState>,
    Json(input): Json<SetViewRequest>,
) -> Json<SessionSnapshot> {
    Json(controller.set_view(input.view).await)
}

// ============================================================
// Extraction and Staging
// ============================================================

pub async fn extract(
    State(controller): State<AppState>,
    Json(input): Json<ExtractRequest>,
) -> ApiResult<Vec<ExtractedQuestion>> {
    run_detached(async move { controller.extract(input.text, input.document).await })
        .await
        .map(Json)
}

pub async fn stage(
    State(controller): State<AppState>,
    Json(input): Json<StageRequest>,
) -> ApiResult<Vec<ExtractedQuestion>> {
    controller
        .stage(&input.key)
        .map(Json)
        .map_err(controller_error)
}

pub async fn clear_staged(
    State(controller): State<AppState>,
) -> Result<StatusCode, (StatusCode, String)> {
    controller.clear_staged().map_err(controller_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Synthesis
// ============================================================

pub async fn synthesize(State(controller): State<AppState>) -> ApiResult<SessionSnapshot> {
    run_detached(async move { controller.synthesize().await })
        .await
        .map(Json)
}

pub async fn retry(State(controller): State<AppState>) -> Json<SessionSnapshot> {
    Json(controller.retry())
}

pub async fn discard(State(controller): State<AppState>) -> ApiResult<SessionSnapshot> {
    controller.discard().map(Json).map_err(controller_error)
}

// ============================================================
// Vault
// ============================================================

pub async fn list_vault(State(controller): State<AppState>) -> Json<Vec<VaultItem>> {
    Json(controller.refresh_vault().await)
}
