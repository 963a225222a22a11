//! In-process task queue (SPEC_FULL.md §2 A5): no external broker crate is
//! available in this workspace, so "submit task, get a handle back" is
//! modeled directly on top of a tokio-spawned future, with status tracked
//! in `task_runs` the same way the teacher's job scheduler tracks
//! `job_runs` (`services/job_scheduler_service.rs::execute_job_with_tracking`).

use std::future::Future;

use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::task_run_queries;

#[derive(Clone)]
pub struct TaskQueue {
    pool: PgPool,
}

impl TaskQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a queued `task_runs` row, then hands `work` to its own
    /// tokio task so the HTTP caller never blocks on extraction. Returns
    /// the task id immediately.
    pub async fn submit<F>(&self, task_kind: &str, work: F) -> Result<Uuid, sqlx::Error>
    where
        F: Future<Output = Result<JsonValue, String>> + Send + 'static,
    {
        let mut conn = self.pool.acquire().await?;
        let task_run = task_run_queries::create_queued(&mut conn, task_kind).await?;
        drop(conn);

        let pool = self.pool.clone();
        let task_id = task_run.id;

        tokio::spawn(async move {
            if let Ok(mut conn) = pool.acquire().await {
                let _ = task_run_queries::mark_running(&mut conn, task_id).await;
            }

            let outcome = work.await;

            if let Ok(mut conn) = pool.acquire().await {
                match outcome {
                    Ok(result) => {
                        if let Err(e) = task_run_queries::mark_success(&mut conn, task_id, result).await {
                            tracing::error!(task_id = %task_id, error = %e, "failed to record task success");
                        }
                    }
                    Err(message) => {
                        tracing::error!(task_id = %task_id, error = %message, "task failed");
                        if let Err(e) = task_run_queries::mark_failed(&mut conn, task_id, &message).await {
                            tracing::error!(task_id = %task_id, error = %e, "failed to record task failure");
                        }
                    }
                }
            }
        });

        Ok(task_id)
    }
}
