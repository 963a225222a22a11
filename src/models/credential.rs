use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Row shape for `statement_pdfs`. The stored password is AEAD-encrypted
/// at rest; `pipeline::credential` owns the encrypt/decrypt boundary.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatementCredential {
    pub user_id: Uuid,
    pub sender_email: String,
    pub filename: String,
    pub encrypted_password: String,
    pub is_active: bool,
}
