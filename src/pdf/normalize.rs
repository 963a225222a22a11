//! Value normalizers (SPEC_FULL.md §4.2, C2): date/amount parsing and the
//! payment-method / entity-name extraction tables, grounded in
//! `pdf_normalizer/values_extract.py` and `common/constants.py` in the
//! original implementation.

use std::sync::OnceLock;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use regex::Regex;

use crate::models::Direction;

/// Day-first tolerant date parse. Tries the formats bank statements
/// actually use; fails on empty or unparseable input.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty date".to_string());
    }

    const FORMATS: &[&str] = &[
        "%d-%m-%Y",
        "%d/%m/%Y",
        "%d-%m-%y",
        "%d/%m/%y",
        "%d %b %Y",
        "%d %b, %Y",
        "%d-%b-%Y",
        "%d %B %Y",
    ];

    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Ok(date);
        }
    }

    Err(format!("unparseable date: {trimmed}"))
}

/// Strips everything but digits and the decimal point; empty result is
/// null (no amount present), not zero.
pub fn parse_amount(raw: &str) -> Option<BigDecimal> {
    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    if cleaned.is_empty() || cleaned == "." {
        return None;
    }
    cleaned.parse().ok()
}

fn word_boundary_cr_dr() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(Cr|Dr)\b").expect("valid regex"))
}

/// Looks for a whole-word Cr/Dr marker in the narration; authoritative when
/// present (see SPEC_FULL.md §4.3: "narration markers are authoritative").
pub fn determine_transaction_type(narration: &str) -> Option<Direction> {
    word_boundary_cr_dr().captures(narration).map(|c| {
        if c.get(1).unwrap().as_str().eq_ignore_ascii_case("cr") {
            Direction::Credit
        } else {
            Direction::Debit
        }
    })
}

struct PaymentMethodRule {
    label: &'static str,
    pattern: &'static str,
}

/// Exact ordered table from `common/constants.py::PAYMENT_METHODS`. Order
/// matters: the first match wins, and dict insertion order in the original
/// is preserved here.
const PAYMENT_METHOD_TABLE: &[PaymentMethodRule] = &[
    PaymentMethodRule { label: "UPI", pattern: r"^UPI" },
    PaymentMethodRule { label: "NEFT", pattern: r"^NEFT" },
    PaymentMethodRule { label: "IMPS", pattern: r"^IMPS" },
    PaymentMethodRule { label: "RTGS", pattern: r"^RTGS" },
    PaymentMethodRule { label: "NACH", pattern: r"^NACH" },
    PaymentMethodRule { label: "RTNCHG", pattern: r"^RTNCHG" },
    PaymentMethodRule { label: "ACH", pattern: r"^ACH" },
    PaymentMethodRule { label: "CHEQUE", pattern: r"^(CHQ|CHEQUE|CLG)" },
    PaymentMethodRule { label: "ATM", pattern: r"\b(ATW|ATL)\b" },
    PaymentMethodRule {
        label: "CARD",
        pattern: r"(VISA|MASTERCARD|RUPAY|DEBIT CARD|CREDIT CARD|POS)",
    },
    PaymentMethodRule { label: "NETBANKING", pattern: r"(INB|NETBANKING|NET BANKING)" },
    PaymentMethodRule { label: "MOBILE_BANKING", pattern: r"\bMB\b" },
];

fn compiled_payment_methods() -> &'static Vec<(&'static str, Regex)> {
    static TABLE: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        PAYMENT_METHOD_TABLE
            .iter()
            .map(|rule| (rule.label, Regex::new(rule.pattern).expect("valid regex")))
            .collect()
    })
}

pub fn extract_payment_method(description: &str) -> Option<&'static str> {
    let upper = description.to_uppercase();
    compiled_payment_methods()
        .iter()
        .find(|(_, re)| re.is_match(&upper))
        .map(|(label, _)| *label)
}

fn upi_dr_cr_segment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `UPI/<DR|CR>/<reference>/<entity>/...` — the entity is the segment
    // following the reference id, not the one right after the marker.
    RE.get_or_init(|| Regex::new(r"/(?:DR|CR)/[^/]+/([^/]+)/").expect("valid regex"))
}

/// Prefix-dispatched entity extraction, grounded in
/// `pdf_normalizer/values_extract.py::extract_entity_name`.
pub fn extract_entity_name(description: &str) -> Option<String> {
    let upper = description.to_uppercase();
    let parts: Vec<&str> = description.split('/').collect();

    if upper.starts_with("UPI") {
        if let Some(caps) = upi_dr_cr_segment().captures(description) {
            return Some(caps.get(1).unwrap().as_str().trim().to_string());
        }
        return parts.get(1).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    }

    if upper.starts_with("NEFT") || upper.starts_with("IMPS") || upper.starts_with("RTGS") {
        let hyphen_parts: Vec<&str> = description.split('-').collect();
        return hyphen_parts.get(2).map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    }

    if upper.starts_with("NACH") || upper.starts_with("ACH") {
        return parts.last().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    }

    if upper.starts_with("RTNCHG") {
        if parts.len() >= 4 {
            return parts.get(parts.len() - 2).map(|s| s.trim().to_string());
        }
        return None;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_first_hyphenated_date() {
        assert_eq!(parse_date("01-11-2025").unwrap(), NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
    }

    #[test]
    fn empty_amount_is_none() {
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn strips_currency_and_commas_from_amount() {
        assert_eq!(parse_amount("72,500.00"), Some("72500.00".parse().unwrap()));
    }

    #[test]
    fn upi_payment_method_matches_prefix() {
        assert_eq!(extract_payment_method("UPI/DR/531715436912/KANTI RAMULU GA/KKBK/Ph"), Some("UPI"));
    }

    #[test]
    fn extracts_upi_entity_after_reference_segment() {
        assert_eq!(
            extract_entity_name("UPI/DR/531715436912/KANTI RAMULU GA/KKBK/Ph"),
            Some("KANTI RAMULU GA".to_string())
        );
    }

    #[test]
    fn extracts_neft_entity_as_the_single_third_hyphen_field() {
        assert_eq!(
            extract_entity_name("NEFT-ICIC0000123-JOHN DOE-REF999"),
            Some("JOHN DOE".to_string())
        );
    }

    #[test]
    fn determines_direction_from_whole_word_marker() {
        assert_eq!(determine_transaction_type("Some txn Cr amount"), Some(Direction::Credit));
        assert_eq!(determine_transaction_type("Some txn Dr amount"), Some(Direction::Debit));
        assert_eq!(determine_transaction_type("no marker here"), None);
    }
}
