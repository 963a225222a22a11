//! Fetch active rules scoped to a user/account, grounded in the dynamic
//! query building of `tasks/bank_statement_upload.py` and
//! `tasks/rule_engine_task.py`. Rules are always re-fetched per task; no
//! long-lived cache is maintained (SPEC_FULL.md §3, §5).

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::RuleRow;

/// Rules for one statement's categorization pass: global (`bank_account_id`
/// is null) or scoped to this specific account, ordered by priority
/// (SPEC_FULL.md §4.8 step 6).
pub async fn fetch_for_account(
    conn: &mut PgConnection,
    user_id: Uuid,
    bank_account_id: Uuid,
) -> Result<Vec<RuleRow>, sqlx::Error> {
    sqlx::query_as::<_, RuleRow>(
        "SELECT id, user_id, dsl_text, priority, is_active, bank_account_id
         FROM categorization_rules
         WHERE user_id = $1 AND is_active = true AND (bank_account_id IS NULL OR bank_account_id = $2)
         ORDER BY priority ASC, id ASC",
    )
    .bind(user_id)
    .bind(bank_account_id)
    .fetch_all(conn)
    .await
}

/// Rules for a `/v1/rule-engine` re-run: optionally filtered by an explicit
/// id list and/or a bank account, grounded in `rule_engine_task.py`'s
/// dynamic `query_rules` construction.
pub async fn fetch_for_rule_engine(
    conn: &mut PgConnection,
    user_id: Uuid,
    bank_account_id: Option<Uuid>,
    rule_ids: Option<&[i64]>,
) -> Result<Vec<RuleRow>, sqlx::Error> {
    sqlx::query_as::<_, RuleRow>(
        "SELECT id, user_id, dsl_text, priority, is_active, bank_account_id
         FROM categorization_rules
         WHERE user_id = $1
           AND is_active = true
           AND ($2::uuid IS NULL OR bank_account_id = $2 OR bank_account_id IS NULL)
           AND ($3::bigint[] IS NULL OR id = ANY($3))
         ORDER BY priority ASC, id ASC",
    )
    .bind(user_id)
    .bind(bank_account_id)
    .bind(rule_ids)
    .fetch_all(conn)
    .await
}
