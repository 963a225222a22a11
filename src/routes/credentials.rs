//! `POST /v1/file-credentials`, grounded in `api/v1/file_password_api.py`
//! (the route name's spelling is corrected per SPEC_FULL.md §6 from the
//! original's `file-credentails`).

use axum::routing::post;
use axum::{Json, Router};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db::credential_queries;
use crate::errors::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(store_credential))
}

#[derive(Debug, Deserialize)]
pub struct FileCredentialsRequest {
    pub user_id: Uuid,
    pub sender_email: String,
    pub filename: String,
    pub pdf_password: String,
}

#[derive(Debug, Serialize)]
pub struct FileCredentialsResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub filename: String,
}

async fn store_credential(
    axum::extract::State(state): axum::extract::State<AppState>,
    Json(request): Json<FileCredentialsRequest>,
) -> Result<(StatusCode, Json<FileCredentialsResponse>), AppError> {
    info!(filename = %request.filename, sender = %request.sender_email, "POST /v1/file-credentials");

    let encrypted = state
        .cipher
        .encrypt(&request.pdf_password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let mut conn = state.pool.acquire().await?;
    credential_queries::upsert(&mut conn, request.user_id, &request.sender_email, &request.filename, &encrypted)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(FileCredentialsResponse {
            status: "success",
            message: "Credentials updated successfully",
            filename: request.filename,
        }),
    ))
}
