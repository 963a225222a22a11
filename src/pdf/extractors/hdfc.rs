//! Grounded in `pdf_normalizer/banks/hdfc_bank.py`: the simplest extractor
//! in the original — detection is a bare substring check, and rows are
//! parsed by a shared date/amount rule rather than bank-specific columns.

use crate::pdf::access::PdfAccess;
use crate::pdf::extractors::{build_transaction, AccountDetails, Extractor};
use crate::pdf::normalize;
use crate::models::{Direction, Transaction};

pub struct HdfcExtractor;

impl Extractor for HdfcExtractor {
    fn bank_name(&self) -> &'static str {
        "HDFC"
    }

    fn detect(&self, header_text: &str) -> bool {
        header_text.to_lowercase().contains("hdfc")
    }

    fn parse_account_details(&self, header_text: &str) -> AccountDetails {
        let number = crate::pdf::extractors::util::find_account_number(header_text);
        let ifsc_code = crate::pdf::extractors::util::find_ifsc(header_text, "HDFC0");
        AccountDetails { number, ifsc_code, account_type: None }
    }

    fn parse_rows(&self, logical_rows: &[Vec<String>], _access: &dyn PdfAccess) -> Vec<Transaction> {
        let mut out = Vec::new();
        let mut last_amount = None;
        let mut last_direction = Direction::Debit;

        for row in logical_rows {
            let Some(date_str) = row.first() else { continue };
            let Ok(date) = normalize::parse_date(date_str) else { continue };
            let description = row.get(1).cloned().unwrap_or_default();
            if description.is_empty() {
                continue;
            }
            let reference_id = row.get(2).filter(|s| !s.is_empty()).cloned();

            let amount_cell = row.get(row.len().saturating_sub(2)).cloned().unwrap_or_default();
            let amount = normalize::parse_amount(&amount_cell).or(last_amount.clone());
            let Some(amount) = amount else { continue };
            last_amount = Some(amount.clone());

            let direction = normalize::determine_transaction_type(&description).unwrap_or(last_direction);
            last_direction = direction;

            let entity_name = normalize::extract_entity_name(&description);
            let payment_method = normalize::extract_payment_method(&description);

            out.push(build_transaction(date, description, entity_name, amount, direction, payment_method, reference_id));
        }

        out
    }
}
