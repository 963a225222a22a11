//! Grounded in `pdf_normalizer/banks/kotak_bank.py`. The sole extractor
//! that re-walks `PdfAccess` tables directly instead of reconstructed
//! logical rows: KOTAK statements carry debit and credit in separate table
//! columns rather than embedded in the narration (DESIGN.md open question:
//! KOTAK's PDF re-walk).

use bigdecimal::BigDecimal;

use crate::pdf::access::PdfAccess;
use crate::pdf::extractors::{build_transaction, util, AccountDetails, Extractor};
use crate::pdf::normalize;
use crate::models::{Direction, Transaction};

pub struct KotakExtractor;

impl Extractor for KotakExtractor {
    fn bank_name(&self) -> &'static str {
        "KOTAK"
    }

    fn detect(&self, header_text: &str) -> bool {
        let lower = header_text.to_lowercase();
        lower.contains("kotak mahindra bank") || lower.contains("kkbk")
    }

    fn parse_account_details(&self, header_text: &str) -> AccountDetails {
        let number = util::find_account_number(header_text);
        let ifsc_code = util::find_ifsc(header_text, "KKBK0");
        let account_type = util::find_account_type(header_text)
            .and_then(|raw| crate::models::AccountType::from_raw(&raw));
        AccountDetails { number, ifsc_code, account_type }
    }

    fn parse_rows(&self, _logical_rows: &[Vec<String>], access: &dyn PdfAccess) -> Vec<Transaction> {
        let mut out = Vec::new();

        for table in access.tables() {
            for row in table {
                let Some(date_str) = row.get(1) else { continue };
                let Ok(date) = normalize::parse_date(date_str) else { continue };

                let description = row.get(2).cloned().unwrap_or_default();
                if description.to_uppercase().contains("OPENING BALANCE") {
                    continue;
                }

                let reference_id = row.get(3).filter(|s| !s.is_empty()).cloned();
                let debit = row.get(4).and_then(|s| normalize::parse_amount(s));
                let credit = row.get(5).and_then(|s| normalize::parse_amount(s));

                let (amount, direction): (BigDecimal, Direction) = match (credit, debit) {
                    (Some(c), _) => (c, Direction::Credit),
                    (None, Some(d)) => (d, Direction::Debit),
                    (None, None) => continue,
                };

                let (entity_name, payment_method) = if description.to_uppercase().starts_with("INT.PD") {
                    (None, Some("INTEREST"))
                } else {
                    (normalize::extract_entity_name(&description), normalize::extract_payment_method(&description))
                };

                out.push(build_transaction(date, description, entity_name, amount, direction, payment_method, reference_id));
            }
        }

        out
    }
}
