//! Task-run bookkeeping backing `GET /v1/tasks/:task_id` (SPEC_FULL.md §6,
//! §3 schema). Every queued unit of work gets a row here before it starts,
//! so a client polling the status endpoint always finds something, even if
//! the worker hasn't picked it up yet.

use serde_json::Value as JsonValue;
use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{TaskRun, TaskStatus};

pub async fn create_queued(conn: &mut PgConnection, task_kind: &str) -> Result<TaskRun, sqlx::Error> {
    sqlx::query_as::<_, TaskRun>(
        "INSERT INTO task_runs (id, task_kind, status, submitted_at)
         VALUES ($1, $2, $3, now())
         RETURNING id, task_kind, status, submitted_at, completed_at, error_message, result_summary",
    )
    .bind(Uuid::new_v4())
    .bind(task_kind)
    .bind(TaskStatus::Queued)
    .fetch_one(conn)
    .await
}

pub async fn mark_running(conn: &mut PgConnection, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE task_runs SET status = $2 WHERE id = $1")
        .bind(id)
        .bind(TaskStatus::Running)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn mark_success(conn: &mut PgConnection, id: Uuid, result_summary: JsonValue) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE task_runs SET status = $2, result_summary = $3, completed_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(TaskStatus::Success)
    .bind(result_summary)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn mark_failed(conn: &mut PgConnection, id: Uuid, error_message: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE task_runs SET status = $2, error_message = $3, completed_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(TaskStatus::Failed)
    .bind(error_message)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<TaskRun>, sqlx::Error> {
    sqlx::query_as::<_, TaskRun>(
        "SELECT id, task_kind, status, submitted_at, completed_at, error_message, result_summary
         FROM task_runs WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}
