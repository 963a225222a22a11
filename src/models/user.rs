use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Ambient: the original's `ss_users` table is consulted by every task
/// entry point (email -> id) without the distillation spelling out its
/// shape (SPEC_FULL.md §6).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
}
