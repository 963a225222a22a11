//! Upsert writer (SPEC_FULL.md §4.9, C9), grounded in
//! `model_actions/transactions.py::bulk_insert_transactions`, upgraded
//! from the original's `ON CONFLICT DO NOTHING` to a proper `DO UPDATE`
//! (DESIGN.md open question: upsert conflict key).

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::db::retry;
use crate::models::Transaction;

#[derive(Debug, Clone, Serialize)]
pub struct UpsertError {
    pub index: usize,
    pub reference_id: Option<String>,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpsertStats {
    pub inserted: usize,
    pub failed: usize,
    pub errors: Vec<UpsertError>,
}

const INSERT_HEADER: &str = "INSERT INTO transactions (
    id, user_id, bank_account_id, transaction_date, description, entity_name,
    amount, currency, reference_id, category_id, tag_id, type_id,
    payment_method_id, goal_id, extra
) ";

const CONFLICT_CLAUSE: &str = " ON CONFLICT (user_id, reference_id) WHERE reference_id IS NOT NULL DO UPDATE SET
    bank_account_id = EXCLUDED.bank_account_id,
    transaction_date = EXCLUDED.transaction_date,
    description = EXCLUDED.description,
    entity_name = EXCLUDED.entity_name,
    amount = EXCLUDED.amount,
    currency = EXCLUDED.currency,
    category_id = EXCLUDED.category_id,
    tag_id = EXCLUDED.tag_id,
    type_id = EXCLUDED.type_id,
    payment_method_id = EXCLUDED.payment_method_id,
    goal_id = EXCLUDED.goal_id,
    extra = EXCLUDED.extra,
    updated_at = now()";

fn extra_json(tx: &Transaction) -> JsonValue {
    serde_json::to_value(&tx.extra).unwrap_or(JsonValue::Null)
}

async fn insert_one(conn: &mut PgConnection, tx: &Transaction) -> Result<(), sqlx::Error> {
    let extra = extra_json(tx);
    let id = Uuid::new_v4();
    sqlx::query(&format!("{INSERT_HEADER} VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15) {CONFLICT_CLAUSE}"))
        .bind(id)
        .bind(tx.user_id)
        .bind(tx.bank_account_id)
        .bind(tx.transaction_date)
        .bind(&tx.description)
        .bind(&tx.entity_name)
        .bind(&tx.amount)
        .bind(&tx.currency)
        .bind(&tx.reference_id)
        .bind(tx.category_id)
        .bind(tx.tag_id)
        .bind(tx.type_id)
        .bind(tx.payment_method_id)
        .bind(tx.goal_id)
        .bind(extra)
        .execute(conn)
        .await?;
    Ok(())
}

/// Chunked batched execute with per-row fallback on a chunk failure
/// (SPEC_FULL.md §4.9 steps 3-4): one malformed value must not lose the
/// rest of the batch.
pub async fn bulk_upsert(
    conn: &mut PgConnection,
    transactions: &[Transaction],
    chunk_size: usize,
) -> UpsertStats {
    let mut stats = UpsertStats::default();
    if transactions.is_empty() {
        return stats;
    }
    let chunk_size = chunk_size.max(1);

    for (chunk_index, chunk) in transactions.chunks(chunk_size).enumerate() {
        let base_index = chunk_index * chunk_size;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(INSERT_HEADER);
        builder.push_values(chunk, |mut b, tx| {
            b.push_bind(Uuid::new_v4());
            b.push_bind(tx.user_id);
            b.push_bind(tx.bank_account_id);
            b.push_bind(tx.transaction_date);
            b.push_bind(&tx.description);
            b.push_bind(&tx.entity_name);
            b.push_bind(&tx.amount);
            b.push_bind(&tx.currency);
            b.push_bind(&tx.reference_id);
            b.push_bind(tx.category_id);
            b.push_bind(tx.tag_id);
            b.push_bind(tx.type_id);
            b.push_bind(tx.payment_method_id);
            b.push_bind(tx.goal_id);
            b.push_bind(extra_json(tx));
        });
        builder.push(CONFLICT_CLAUSE);

        // A transient connection hiccup (SPEC_FULL.md §7 `TransientStorageError`)
        // gets bounded, jittered retries before the chunk is treated as a
        // genuine per-row failure; a malformed value in the chunk fails fast
        // into the per-row fallback instead since retrying it changes nothing.
        let mut attempt = 0;
        let chunk_result = loop {
            match builder.build().execute(&mut *conn).await {
                Ok(result) => break Ok(result),
                Err(err) if attempt + 1 < retry::MAX_ATTEMPTS && retry::is_transient(&err) => {
                    attempt += 1;
                    tracing::warn!(chunk = chunk_index, attempt, error = %err, "transient error on upsert chunk, retrying");
                    tokio::time::sleep(retry::backoff_delay(attempt)).await;
                }
                Err(err) => break Err(err),
            }
        };

        match chunk_result {
            Ok(result) => {
                stats.inserted += result.rows_affected() as usize;
            }
            Err(chunk_err) => {
                tracing::warn!(chunk = chunk_index, error = %chunk_err, "upsert chunk failed, falling back to per-row");
                for (offset, tx) in chunk.iter().enumerate() {
                    match insert_one(conn, tx).await {
                        Ok(()) => stats.inserted += 1,
                        Err(row_err) => {
                            stats.failed += 1;
                            stats.errors.push(UpsertError {
                                index: base_index + offset,
                                reference_id: tx.reference_id.clone(),
                                error: row_err.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }

    stats
}

/// Row shape as actually persisted. `direction` isn't a stored column
/// (SPEC_FULL.md §4.9 step 1), so a re-run reconstructs it as `Debit` and
/// drops `payment_method`; no stored rule reads either field back.
#[derive(sqlx::FromRow)]
struct PersistedTransactionRow {
    user_id: Uuid,
    bank_account_id: Uuid,
    transaction_date: NaiveDate,
    description: String,
    entity_name: Option<String>,
    amount: bigdecimal::BigDecimal,
    currency: String,
    reference_id: Option<String>,
    category_id: Option<i64>,
    tag_id: Option<i64>,
    type_id: Option<i64>,
    payment_method_id: Option<i64>,
    goal_id: Option<i64>,
    extra: JsonValue,
}

impl PersistedTransactionRow {
    fn into_transaction(self) -> Transaction {
        let extra = serde_json::from_value(self.extra).unwrap_or_default();
        Transaction {
            user_id: self.user_id,
            bank_account_id: self.bank_account_id,
            transaction_date: self.transaction_date,
            description: self.description,
            entity_name: self.entity_name,
            amount: self.amount,
            currency: self.currency,
            direction: crate::models::Direction::Debit,
            payment_method: None,
            reference_id: self.reference_id,
            category_id: self.category_id,
            tag_id: self.tag_id,
            type_id: self.type_id,
            payment_method_id: self.payment_method_id,
            goal_id: self.goal_id,
            extra,
        }
    }
}

/// Fetches already-persisted transactions for a `/v1/rule-engine` re-run
/// (SPEC_FULL.md §4.8, `run_rule_engine`), filtered by optional account
/// and date range.
pub async fn fetch_for_rule_engine(
    conn: &mut PgConnection,
    user_id: Uuid,
    bank_account_id: Option<Uuid>,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
        "SELECT user_id, bank_account_id, transaction_date, description, entity_name,
                amount, currency, reference_id, category_id, tag_id, type_id,
                payment_method_id, goal_id, extra
         FROM transactions WHERE user_id = ",
    );
    builder.push_bind(user_id);

    if let Some(account_id) = bank_account_id {
        builder.push(" AND bank_account_id = ").push_bind(account_id);
    }
    if let Some(from) = from_date {
        builder.push(" AND transaction_date >= ").push_bind(from);
    }
    if let Some(to) = to_date {
        builder.push(" AND transaction_date <= ").push_bind(to);
    }

    let rows = builder.build_query_as::<PersistedTransactionRow>().fetch_all(conn).await?;
    Ok(rows.into_iter().map(PersistedTransactionRow::into_transaction).collect())
}
