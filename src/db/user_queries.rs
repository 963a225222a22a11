//! Ambient: backs the email->id lookup every task entry point performs
//! first (original `ss_users` table, SPEC_FULL.md §6).

use sqlx::PgConnection;

use crate::models::User;

pub async fn find_active_by_email(conn: &mut PgConnection, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, is_active FROM users WHERE email = $1 AND is_active = true",
    )
    .bind(email)
    .fetch_optional(conn)
    .await
}
