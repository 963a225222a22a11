//! `POST /v1/rule-engine`, grounded in `api/v1/rule_engine_api.py` and
//! `tasks/rule_engine_task.py::run_rule_engine`.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipeline::orchestrator;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(run_rule_engine))
}

#[derive(Debug, Deserialize)]
pub struct RuleEnginePayload {
    pub user_email: String,
    pub bank_account_id: Option<Uuid>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    #[serde(default)]
    pub rules_id: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct RuleEngineResponse {
    pub count: usize,
    pub stats: RuleEngineStats,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RuleEngineStats {
    pub inserted: usize,
    pub failed: usize,
}

async fn run_rule_engine(
    State(state): State<AppState>,
    Json(request): Json<RuleEnginePayload>,
) -> Result<Json<RuleEngineResponse>, AppError> {
    info!(user_email = %request.user_email, "POST /v1/rule-engine");

    let rule_ids = if request.rules_id.is_empty() { None } else { Some(request.rules_id.as_slice()) };

    let summary = orchestrator::run_rule_engine(
        &state.pool,
        state.settings.upsert_chunk_size,
        &request.user_email,
        request.bank_account_id,
        request.from_date,
        request.to_date,
        rule_ids,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "rule engine run failed");
        AppError::from(e)
    })?;

    Ok(Json(RuleEngineResponse {
        count: summary.count,
        stats: RuleEngineStats { inserted: summary.inserted, failed: summary.failed },
        status: "success",
    }))
}
