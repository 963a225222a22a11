//! `GET /v1/tasks/:task_id`, ambient: the teacher's job-status convention
//! applied to this crate's queued statement/rule-engine tasks so the
//! `task_id` handed back by `/v1/upload` is actually useful.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::db::task_run_queries;
use crate::errors::AppError;
use crate::models::TaskStatus;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/:task_id", get(get_task))
}

#[derive(Debug, Serialize)]
pub struct TaskStatusResponse {
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub error: Option<String>,
    pub result: Option<serde_json::Value>,
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Result<Json<TaskStatusResponse>, AppError> {
    info!(%task_id, "GET /v1/tasks/:task_id");

    let mut conn = state.pool.acquire().await?;
    let task = task_run_queries::find_by_id(&mut conn, task_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no task with id {task_id}")))?;

    Ok(Json(TaskStatusResponse {
        task_id: task.id,
        status: task.status,
        submitted_at: task.submitted_at,
        completed_at: task.completed_at,
        error: task.error_message,
        result: task.result_summary,
    }))
}
