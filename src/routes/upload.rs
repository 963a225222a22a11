//! `POST /v1/upload`, grounded in `api/v1/file_parser_api.py::file_upload`.
//! Stages the multipart body to disk, enqueues the pipeline task, and
//! returns immediately with a task id the caller can poll.

use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::services::upload_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    pub filename: String,
    pub subject: Option<String>,
    pub from_email: Option<String>,
    pub date: Option<String>,
    pub task_id: Uuid,
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut filename: Option<String> = None;
    let mut subject: Option<String> = None;
    let mut from_email: Option<String> = None;
    let mut to_email: Option<String> = None;
    let mut date: Option<String> = None;
    let mut staged_path: Option<std::path::PathBuf> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::Validation(e.to_string()))? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or("statement.pdf").to_string();
                let staged = upload_service::stage_upload(
                    &state.settings.upload_temp_dir,
                    &original_name,
                    field,
                    state.settings.upload_max_bytes,
                )
                .await?;
                filename = Some(original_name);
                staged_path = Some(staged.path);
            }
            "subject" => subject = Some(field.text().await.map_err(|e| AppError::Validation(e.to_string()))?),
            "from_email" => from_email = Some(field.text().await.map_err(|e| AppError::Validation(e.to_string()))?),
            "to_email" => to_email = Some(field.text().await.map_err(|e| AppError::Validation(e.to_string()))?),
            "date" => date = Some(field.text().await.map_err(|e| AppError::Validation(e.to_string()))?),
            _ => {}
        }
    }

    let filename = filename.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    let staged_path = staged_path.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    let from_email = from_email.ok_or_else(|| AppError::Validation("from_email is required".to_string()))?;
    let to_email = to_email.ok_or_else(|| AppError::Validation("to_email is required".to_string()))?;

    info!(filename = %filename, from = %from_email, to = %to_email, "staged upload, enqueueing pipeline task");

    let cipher = state.cipher.clone();
    let registry = state.extractor_registry.clone();
    let pool = state.pool.clone();
    let chunk_size = state.settings.upsert_chunk_size;
    let staged_path_str = staged_path.to_string_lossy().to_string();
    let filename_for_task = filename.clone();
    let from_email_for_task = from_email.clone();
    let to_email_for_task = to_email.clone();

    let task_id = state
        .queue
        .submit("statement_upload", async move {
            let result = crate::pipeline::orchestrator::process_bank_pdf(
                &pool,
                &cipher,
                &registry,
                chunk_size,
                &staged_path_str,
                &filename_for_task,
                &from_email_for_task,
                &to_email_for_task,
            )
            .await;

            let _ = tokio::fs::remove_file(&staged_path_str).await;

            result.map(|summary| serde_json::to_value(summary).unwrap_or(json!({}))).map_err(|e| e.to_string())
        })
        .await
        .map_err(AppError::from)?;

    Ok(Json(UploadResponse {
        message: "File uploaded and queued for processing",
        filename,
        subject,
        from_email: Some(from_email),
        date,
        task_id,
    }))
}
