//! Grounded in `pdf_normalizer/banks/sbi_bank.py`, including its
//! prefix-based post-processing hooks and the dedup-by-exact-tuple
//! strategy that explicitly preserves legitimate same-day, same-amount
//! transactions that differ by description or reference.

use std::collections::HashSet;

use crate::models::{Direction, Transaction};
use crate::pdf::access::PdfAccess;
use crate::pdf::extractors::{build_transaction, util, AccountDetails, Extractor};
use crate::pdf::normalize;

pub struct SbiExtractor;

impl Extractor for SbiExtractor {
    fn bank_name(&self) -> &'static str {
        "SBI"
    }

    fn detect(&self, header_text: &str) -> bool {
        let lower = header_text.to_lowercase();
        lower.contains("state bank of india") || lower.contains("sbi")
    }

    fn parse_account_details(&self, header_text: &str) -> AccountDetails {
        let number = util::find_account_number(header_text).or_else(|| last_masked_account(header_text));
        let ifsc_code = util::find_ifsc(header_text, "SBIN0");
        let account_type = util::find_account_type(header_text)
            .and_then(|raw| crate::models::AccountType::from_raw(&raw));
        AccountDetails { number, ifsc_code, account_type }
    }

    fn parse_rows(&self, logical_rows: &[Vec<String>], _access: &dyn PdfAccess) -> Vec<Transaction> {
        let mut out = Vec::new();
        let mut seen: HashSet<(String, String, String, String)> = HashSet::new();

        for row in logical_rows {
            let Some(date_str) = row.first() else { continue };
            let Ok(date) = normalize::parse_date(date_str) else { continue };
            let mut description = row.get(1).cloned().unwrap_or_default();
            if description.is_empty() {
                continue;
            }
            let reference_id = row.get(2).filter(|s| !s.is_empty()).cloned();

            let amount_cell = row.get(row.len().saturating_sub(2)).cloned().unwrap_or_default();
            let Some(amount) = normalize::parse_amount(&amount_cell) else { continue };

            let direction = normalize::determine_transaction_type(&description).unwrap_or(Direction::Debit);

            let dedup_key = (
                date.to_string(),
                amount.to_string(),
                description.clone(),
                reference_id.clone().unwrap_or_default(),
            );
            if !seen.insert(dedup_key) {
                continue;
            }

            let mut entity_name = extract_entity_from_description(&description);
            let mut payment_method = normalize::extract_payment_method(&description);

            sbi_post_process(&description, &mut entity_name, &mut payment_method);
            description = description.trim().to_string();

            out.push(build_transaction(date, description, entity_name, amount, direction, payment_method, reference_id));
        }

        out
    }
}

fn last_masked_account(header_text: &str) -> Option<String> {
    static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
    let re = RE.get_or_init(|| regex::Regex::new(r"X{2,}(\d{4})").expect("valid regex"));
    re.find_iter(header_text).last().map(|m| m.as_str().to_string())
}

fn extract_entity_from_description(description: &str) -> Option<String> {
    if description.to_uppercase().starts_with("UPI") {
        let parts: Vec<&str> = description.split('/').collect();
        if let Some(candidate) = parts.get(3) {
            if !candidate.chars().all(|c| c.is_ascii_digit()) {
                return Some(candidate.trim().to_string());
            }
        }
        return None;
    }
    normalize::extract_entity_name(description)
}

fn sbi_post_process(description: &str, entity_name: &mut Option<String>, payment_method: &mut Option<&'static str>) {
    let upper = description.to_uppercase();
    if upper.starts_with("UPI/REF/") {
        *entity_name = None;
        *payment_method = Some("UPI");
    } else if upper.starts_with("SBIYA") || upper.contains("RENEWAL") {
        *entity_name = Some("SBI".to_string());
        *payment_method = Some("SERVICE_CHARGE");
    } else if upper.contains("CASH DEPOSIT") {
        *payment_method = Some("CASH");
    }
}
