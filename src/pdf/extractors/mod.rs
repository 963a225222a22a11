mod hdfc;
mod kotak;
mod sbi;
mod union;
pub(crate) mod util;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::errors::ExtractError;
use crate::models::{AccountType, Direction, Transaction};
use crate::pdf::access::PdfAccess;

pub use hdfc::HdfcExtractor;
pub use kotak::KotakExtractor;
pub use sbi::SbiExtractor;
pub use union::UnionExtractor;

#[derive(Debug, Clone, Default)]
pub struct AccountDetails {
    pub number: Option<String>,
    pub ifsc_code: Option<String>,
    pub account_type: Option<AccountType>,
}

/// Capability set a bank-specific statement parser must provide, grounded
/// in `pdf_normalizer/parsers/base_parser.py::BankStatementParser`.
///
/// `parse_rows` normally operates on reconstructed logical rows; KOTAK is
/// the documented exception that re-walks `access` directly because its
/// credit/debit values live in distinct table columns rather than embedded
/// narration (SPEC_FULL.md §4.3, DESIGN.md).
pub trait Extractor: Send + Sync {
    fn bank_name(&self) -> &'static str;
    fn detect(&self, header_text: &str) -> bool;
    fn parse_account_details(&self, header_text: &str) -> AccountDetails;
    fn parse_rows(&self, logical_rows: &[Vec<String>], access: &dyn PdfAccess) -> Vec<Transaction>;
}

/// Registered in detection order: HDFC, KOTAK, SBI, UNION (DESIGN.md open
/// question: bank detection order).
pub struct ExtractorRegistry {
    extractors: Vec<Box<dyn Extractor>>,
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self {
            extractors: vec![
                Box::new(HdfcExtractor),
                Box::new(KotakExtractor),
                Box::new(SbiExtractor),
                Box::new(UnionExtractor),
            ],
        }
    }
}

impl ExtractorRegistry {
    /// Resolves an extractor. A `bank_hint` (from the sender email domain,
    /// see SPEC_FULL.md §4.8 step 3) takes priority over content detection.
    pub fn resolve(&self, bank_hint: Option<&str>, header_text: &str) -> Result<&dyn Extractor, ExtractError> {
        if let Some(hint) = bank_hint {
            if let Some(extractor) = self.extractors.iter().find(|e| e.bank_name().eq_ignore_ascii_case(hint)) {
                return Ok(extractor.as_ref());
            }
        }

        self.extractors
            .iter()
            .find(|e| e.detect(header_text))
            .map(|e| e.as_ref())
            .ok_or(ExtractError::UnsupportedBank)
    }
}

/// Shared row-to-`Transaction` assembly. `user_id`/`bank_account_id` are
/// left nil; the orchestrator stamps them on every record in step 9
/// (SPEC_FULL.md §4.8).
pub(crate) fn build_transaction(
    transaction_date: NaiveDate,
    description: String,
    entity_name: Option<String>,
    amount: BigDecimal,
    direction: Direction,
    payment_method: Option<&'static str>,
    reference_id: Option<String>,
) -> Transaction {
    Transaction {
        user_id: Uuid::nil(),
        bank_account_id: Uuid::nil(),
        transaction_date,
        description,
        entity_name,
        amount,
        currency: "INR".to_string(),
        direction,
        payment_method: payment_method.map(|p| p.to_string()),
        reference_id,
        category_id: None,
        tag_id: None,
        type_id: None,
        payment_method_id: None,
        goal_id: None,
        extra: std::collections::HashMap::new(),
    }
}
