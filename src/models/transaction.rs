use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A value assignable by a categorization rule, or read from a transaction's
/// dynamic extras. Rule assignment values are `NUMBER | STRING` (see
/// SPEC_FULL.md §4.5/§9); `Decimal` additionally covers comparisons against
/// monetary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Int(i64),
    Decimal(BigDecimal),
    Str(String),
}

impl ScalarValue {
    pub fn as_str_lossy(&self) -> String {
        match self {
            ScalarValue::Int(v) => v.to_string(),
            ScalarValue::Decimal(v) => v.to_string(),
            ScalarValue::Str(v) => v.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Credit,
    Debit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
        }
    }
}

/// The central record produced by extraction and enriched by the rule
/// engine. Standard fields are typed; anything a rule assigns outside the
/// standard set lands in `extra` (see `ss_transactions_template` in the
/// original implementation for the full field set this mirrors).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub user_id: Uuid,
    pub bank_account_id: Uuid,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub entity_name: Option<String>,
    pub amount: BigDecimal,
    pub currency: String,
    pub direction: Direction,
    pub payment_method: Option<String>,
    pub reference_id: Option<String>,
    pub category_id: Option<i64>,
    pub tag_id: Option<i64>,
    pub type_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub goal_id: Option<i64>,
    pub extra: HashMap<String, ScalarValue>,
}

impl Transaction {
    /// Empty-string reference ids must be normalized to the null sentinel
    /// before persistence (see SPEC_FULL.md §3 and §4.8 step 9).
    pub fn normalize_reference_id(&mut self) {
        if matches!(self.reference_id.as_deref(), Some("")) {
            self.reference_id = None;
        }
    }
}

/// The standard assignment-target field names recognized by convention.
/// Any other identifier is still a legal assignment target (§4.5); it is
/// simply routed to `extra` instead of one of these typed slots.
const STANDARD_FIELDS: &[&str] = &["category_id", "tag_id", "type_id", "payment_method_id", "goal_id"];

pub fn is_standard_field(name: &str) -> bool {
    STANDARD_FIELDS.contains(&name)
}

/// Capability trait the rule evaluator and categorizer operate against, so
/// both the fixed §3 fields and the dynamic `extra` side map compose under
/// one lookup/assignment surface.
pub trait TransactionFields {
    fn field(&self, name: &str) -> Option<ScalarValue>;
    fn set_field(&mut self, name: &str, value: ScalarValue);
    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

impl TransactionFields for Transaction {
    fn field(&self, name: &str) -> Option<ScalarValue> {
        match name {
            "transaction_date" => Some(ScalarValue::Str(self.transaction_date.to_string())),
            "description" => Some(ScalarValue::Str(self.description.clone())),
            "entity_name" => self.entity_name.clone().map(ScalarValue::Str),
            "amount" => Some(ScalarValue::Decimal(self.amount.clone())),
            "currency" => Some(ScalarValue::Str(self.currency.clone())),
            "direction" => Some(ScalarValue::Str(self.direction.as_str().to_string())),
            "payment_method" => self.payment_method.clone().map(ScalarValue::Str),
            "reference_id" => self.reference_id.clone().map(ScalarValue::Str),
            "category_id" => self.category_id.map(ScalarValue::Int),
            "tag_id" => self.tag_id.map(ScalarValue::Int),
            "type_id" => self.type_id.map(ScalarValue::Int),
            "payment_method_id" => self.payment_method_id.map(ScalarValue::Int),
            "goal_id" => self.goal_id.map(ScalarValue::Int),
            other => self.extra.get(other).cloned(),
        }
    }

    fn set_field(&mut self, name: &str, value: ScalarValue) {
        match name {
            "category_id" => self.category_id = as_int(&value),
            "tag_id" => self.tag_id = as_int(&value),
            "type_id" => self.type_id = as_int(&value),
            "payment_method_id" => self.payment_method_id = as_int(&value),
            "goal_id" => self.goal_id = as_int(&value),
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }
}

fn as_int(value: &ScalarValue) -> Option<i64> {
    match value {
        ScalarValue::Int(v) => Some(*v),
        ScalarValue::Decimal(v) => v.to_string().parse().ok(),
        ScalarValue::Str(v) => v.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        Transaction {
            user_id: Uuid::nil(),
            bank_account_id: Uuid::nil(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            description: "UPI/DR/531715436912/KANTI RAMULU GA/KKBK/Ph".to_string(),
            entity_name: Some("KANTI RAMULU GA".to_string()),
            amount: "500.00".parse().unwrap(),
            currency: "INR".to_string(),
            direction: Direction::Debit,
            payment_method: Some("UPI".to_string()),
            reference_id: Some("531715436912".to_string()),
            category_id: None,
            tag_id: None,
            type_id: None,
            payment_method_id: None,
            goal_id: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn empty_reference_id_becomes_null() {
        let mut tx = sample();
        tx.reference_id = Some(String::new());
        tx.normalize_reference_id();
        assert_eq!(tx.reference_id, None);
    }

    #[test]
    fn unknown_assignment_lands_in_extra() {
        let mut tx = sample();
        tx.set_field("risk_level", ScalarValue::Int(2));
        tx.set_field("alert_type", ScalarValue::Str("HIGH".to_string()));
        assert_eq!(tx.field("risk_level"), Some(ScalarValue::Int(2)));
        assert_eq!(tx.field("alert_type"), Some(ScalarValue::Str("HIGH".to_string())));
    }

    #[test]
    fn standard_field_routes_to_typed_slot() {
        let mut tx = sample();
        tx.set_field("category_id", ScalarValue::Int(7));
        assert_eq!(tx.category_id, Some(7));
        assert!(tx.extra.get("category_id").is_none());
    }
}
