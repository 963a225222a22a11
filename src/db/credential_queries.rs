//! Suffix-match credential lookup, grounded in
//! `model_actions/statement_pdf.py::get_statement_pdf_password`. Keyed on
//! the last 8 characters of the filename so date-stamped variants share
//! one credential row (SPEC_FULL.md §3, GLOSSARY: "suffix-match credential
//! lookup").

use sqlx::PgConnection;
use uuid::Uuid;

use crate::models::StatementCredential;

fn suffix(filename: &str) -> String {
    let chars: Vec<char> = filename.chars().collect();
    let start = chars.len().saturating_sub(8);
    chars[start..].iter().collect()
}

pub async fn find_password(
    conn: &mut PgConnection,
    user_id: Uuid,
    sender_email: &str,
    filename: &str,
) -> Result<Option<StatementCredential>, sqlx::Error> {
    sqlx::query_as::<_, StatementCredential>(
        "SELECT user_id, sender_email, filename, encrypted_password, is_active
         FROM statement_pdfs
         WHERE user_id = $1 AND sender_email = $2 AND is_active = true AND right(filename, 8) = $3
         LIMIT 1",
    )
    .bind(user_id)
    .bind(sender_email)
    .bind(suffix(filename))
    .fetch_optional(conn)
    .await
}

pub async fn upsert(
    conn: &mut PgConnection,
    user_id: Uuid,
    sender_email: &str,
    filename: &str,
    encrypted_password: &str,
) -> Result<StatementCredential, sqlx::Error> {
    sqlx::query_as::<_, StatementCredential>(
        "INSERT INTO statement_pdfs (user_id, sender_email, filename, encrypted_password, is_active)
         VALUES ($1, $2, $3, $4, true)
         ON CONFLICT (user_id, sender_email, filename)
         DO UPDATE SET encrypted_password = EXCLUDED.encrypted_password, is_active = true, updated_at = now()
         RETURNING user_id, sender_email, filename, encrypted_password, is_active",
    )
    .bind(user_id)
    .bind(sender_email)
    .bind(filename)
    .bind(encrypted_password)
    .fetch_one(conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_takes_last_eight_chars() {
        assert_eq!(suffix("statement-20251101.pdf"), "1101.pdf");
    }

    #[test]
    fn suffix_is_stable_for_short_filenames() {
        assert_eq!(suffix("a.pdf"), "a.pdf");
    }
}
