//! Shared account-header regex helpers used across bank extractors.

use std::sync::OnceLock;

use regex::Regex;

fn account_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)account\s*no\.?\s*[:\-]?\s*(\d{9,18})").expect("valid regex"))
}

pub fn find_account_number(header_text: &str) -> Option<String> {
    account_number_re()
        .captures(header_text)
        .map(|c| c.get(1).unwrap().as_str().to_string())
}

pub fn find_ifsc(header_text: &str, bank_prefix: &str) -> Option<String> {
    let pattern = format!(r"\b{bank_prefix}[A-Z0-9]{{6}}\b");
    let re = Regex::new(&pattern).expect("valid regex");
    re.find(header_text).map(|m| m.as_str().to_string())
}

pub fn find_account_type(header_text: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)(SAVINGS?|CURRENT|SALARY|NRE|NRO|FIXED\s*DEPOSIT|RECURRING\s*DEPOSIT)").expect("valid regex"));
    re.find(header_text).map(|m| m.as_str().trim().to_uppercase())
}
