//! Chunked upload staging, grounded in
//! `api/v1/file_parser_api.py::file_upload`'s manual chunked write loop.
//! Streams a multipart field to a temp file, enforcing the configured
//! byte cap without ever buffering the whole body in memory.

use std::path::PathBuf;

use axum::extract::multipart::Field;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::errors::AppError;

pub struct StagedUpload {
    pub path: PathBuf,
    pub size: usize,
}

pub async fn stage_upload(
    temp_dir: &str,
    original_filename: &str,
    mut field: Field<'_>,
    max_bytes: usize,
) -> Result<StagedUpload, AppError> {
    tokio::fs::create_dir_all(temp_dir)
        .await
        .map_err(|e| AppError::Internal(format!("failed to create upload temp dir: {e}")))?;

    let stem = std::path::Path::new(original_filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("statement");
    let ext = std::path::Path::new(original_filename)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("pdf");
    let staged_path = PathBuf::from(temp_dir).join(format!("{stem}_{}.{ext}", Uuid::new_v4()));

    let mut file = tokio::fs::File::create(&staged_path)
        .await
        .map_err(|e| AppError::Internal(format!("failed to create staged file: {e}")))?;

    let mut size = 0usize;
    while let Some(chunk) = field.chunk().await.map_err(|e| AppError::Validation(e.to_string()))? {
        size += chunk.len();
        if size > max_bytes {
            drop(file);
            let _ = tokio::fs::remove_file(&staged_path).await;
            return Err(AppError::UploadTooLarge);
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("failed to write staged chunk: {e}")))?;
    }
    file.flush().await.map_err(|e| AppError::Internal(e.to_string()))?;

    if size == 0 {
        let _ = tokio::fs::remove_file(&staged_path).await;
        return Err(AppError::UploadEmpty);
    }

    Ok(StagedUpload { path: staged_path, size })
}
