use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The persisted row for a rule; `dsl_text` is parsed fresh by each task
/// (no long-lived AST cache, per SPEC_FULL.md §3).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RuleRow {
    pub id: i64,
    pub user_id: Uuid,
    pub dsl_text: String,
    pub priority: i32,
    pub is_active: bool,
    pub bank_account_id: Option<Uuid>,
}
