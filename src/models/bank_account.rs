use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Mirrors `common/enums.py::AccountType` in the original implementation:
/// a small closed set, normalized from whatever raw label the statement
/// header prints via `from_raw`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
pub enum AccountType {
    Savings,
    Current,
    Salary,
    Nre,
    Nro,
    Fd,
    Rd,
}

impl AccountType {
    /// Prefix-match normalization, grounded in the original's
    /// `AccountType.from_raw` (e.g. "SAVING BANK" -> SAVINGS, "FIXED DEPOSIT" -> FD).
    pub fn from_raw(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_uppercase();
        if upper.starts_with("SAVING") {
            Some(AccountType::Savings)
        } else if upper.starts_with("CURRENT") {
            Some(AccountType::Current)
        } else if upper.starts_with("SALARY") {
            Some(AccountType::Salary)
        } else if upper.starts_with("NRE") {
            Some(AccountType::Nre)
        } else if upper.starts_with("NRO") {
            Some(AccountType::Nro)
        } else if upper.starts_with("FIXED") || upper.starts_with("FD") {
            Some(AccountType::Fd)
        } else if upper.starts_with("RECURRING") || upper.starts_with("RD") {
            Some(AccountType::Rd)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BankAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub number: String,
    pub ifsc_code: Option<String>,
    pub account_type: Option<AccountType>,
}
