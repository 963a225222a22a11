//! Get-or-create with unique-conflict race recovery, grounded in
//! `model_actions/bank_account.py::get_or_create_bank_account`.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::{AccountType, BankAccount};

pub async fn find_by_number(conn: &mut PgConnection, number: &str) -> Result<Option<BankAccount>, sqlx::Error> {
    sqlx::query_as::<_, BankAccount>(
        "SELECT id, user_id, number, ifsc_code, account_type FROM bank_accounts WHERE number = $1",
    )
    .bind(number)
    .fetch_optional(conn)
    .await
}

/// Tries an insert first; on a unique-constraint violation (concurrent
/// creation race), re-reads and returns the row another task just wrote
/// (SPEC_FULL.md §4.8 step 4, §5 ordering guarantees).
pub async fn get_or_create(
    conn: &mut PgConnection,
    user_id: Uuid,
    number: &str,
    ifsc_code: Option<&str>,
    account_type: Option<AccountType>,
) -> Result<BankAccount, sqlx::Error> {
    if let Some(existing) = find_by_number(conn, number).await? {
        return Ok(existing);
    }

    let inserted = sqlx::query_as::<_, BankAccount>(
        "INSERT INTO bank_accounts (id, user_id, number, ifsc_code, account_type)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, user_id, number, ifsc_code, account_type",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(number)
    .bind(ifsc_code)
    .bind(account_type)
    .fetch_one(&mut *conn)
    .await;

    match inserted {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            find_by_number(conn, number)
                .await?
                .ok_or(sqlx::Error::RowNotFound)
        }
        Err(other) => Err(other),
    }
}
