//! Grounded in `pdf_normalizer/banks/union_bank.py`.

use crate::models::{Direction, Transaction};
use crate::pdf::access::PdfAccess;
use crate::pdf::extractors::{build_transaction, util, AccountDetails, Extractor};
use crate::pdf::normalize;

pub struct UnionExtractor;

impl Extractor for UnionExtractor {
    fn bank_name(&self) -> &'static str {
        "UNION"
    }

    fn detect(&self, header_text: &str) -> bool {
        header_text.to_lowercase().contains("ubin")
    }

    fn parse_account_details(&self, header_text: &str) -> AccountDetails {
        let number = util::find_account_number(header_text);
        let ifsc_code = util::find_ifsc(header_text, "UBIN0");
        let account_type = util::find_account_type(header_text).map(|raw| {
            if raw.starts_with("SAVING") {
                "SAVINGS".to_string()
            } else {
                raw
            }
        }).and_then(|raw| crate::models::AccountType::from_raw(&raw));
        AccountDetails { number, ifsc_code, account_type }
    }

    fn parse_rows(&self, logical_rows: &[Vec<String>], _access: &dyn PdfAccess) -> Vec<Transaction> {
        let mut out = Vec::new();
        let mut last_amount = None;
        let mut last_direction = Direction::Debit;

        for row in logical_rows {
            let Some(date_str) = row.first() else { continue };
            let Ok(date) = normalize::parse_date(date_str) else { continue };
            let reference_id = row.get(1).filter(|s| !s.is_empty()).cloned();
            let description = row.get(2).cloned().unwrap_or_default();
            if description.is_empty() {
                continue;
            }

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
