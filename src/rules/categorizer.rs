//! Priority-ordered categorizer (SPEC_FULL.md §4.7, C7), grounded in
//! `rule_engine/evaluator.py::TransactionCategorizer`. First-writer-wins:
//! an assignment placed by a higher-priority (lower-number) rule is never
//! overwritten by a later rule.

use std::collections::HashSet;

use crate::models::{is_standard_field, Transaction, TransactionFields};
use crate::rules::ast::CategorizationRule;
use crate::rules::evaluator::evaluate_rule;

/// Holds rules sorted ascending by priority (stable sort preserves parse
/// order on ties, per SPEC_FULL.md §4.7).
pub struct Categorizer {
    rules: Vec<CategorizationRule>,
}

const FIXED_FIELDS: &[&str] = &[
    "transaction_date",
    "description",
    "entity_name",
    "amount",
    "currency",
    "direction",
    "payment_method",
    "reference_id",
];

impl Categorizer {
    pub fn new(mut rules: Vec<CategorizationRule>) -> Self {
        rules.sort_by_key(|r| r.priority);
        Self { rules }
    }

    fn already_set(tx: &Transaction) -> HashSet<String> {
        let mut set: HashSet<String> = FIXED_FIELDS
            .iter()
            .filter(|f| tx.field(f).is_some())
            .map(|f| f.to_string())
            .collect();
        set.extend(
            [
                "category_id",
                "tag_id",
                "type_id",
                "payment_method_id",
                "goal_id",
            ]
            .into_iter()
            .filter(|f| tx.field(f).is_some())
            .map(|f| f.to_string()),
        );
        set.extend(tx.extra.keys().cloned());
        set
    }

    /// Applies every rule in ascending priority order; for each matching
    /// rule's assignment map, writes fields not yet set and marks them set.
    pub fn categorize(&self, tx: &Transaction) -> Transaction {
        let mut result = tx.clone();
        let mut already_set = Self::already_set(tx);

        for rule in &self.rules {
            if !evaluate_rule(rule, tx) {
                continue;
            }
            for (field, value) in &rule.assignment {
                if already_set.contains(field) {
                    continue;
                }
                result.set_field(field, value.clone());
                already_set.insert(field.clone());
            }
        }

        result
    }

    pub fn categorize_batch(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions.iter().map(|tx| self.categorize(tx)).collect()
    }

    #[allow(dead_code)]
    pub fn is_standard_assignment_field(name: &str) -> bool {
        is_standard_field(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, ScalarValue};
    use crate::rules::parser::parse;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn sample(entity: &str) -> Transaction {
        Transaction {
            user_id: Uuid::nil(),
            bank_account_id: Uuid::nil(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            description: "d".to_string(),
            entity_name: Some(entity.to_string()),
            amount: "50000".parse::<BigDecimal>().unwrap(),
            currency: "INR".to_string(),
            direction: Direction::Debit,
            payment_method: None,
            reference_id: None,
            category_id: None,
            tag_id: None,
            type_id: None,
            payment_method_id: None,
            goal_id: None,
            extra: HashMap::new(),
        }
    }

    #[test]
    fn first_writer_wins_across_priorities() {
        let r1 = parse(r#"rule "r1" where entity_name:con:"KANTI":i assign category_id:1 priority 10;"#).unwrap();
        let r2 = parse(r#"rule "r2" where entity_name:con:"KANTI" assign category_id:99 priority 20;"#).unwrap();
        let categorizer = Categorizer::new(vec![r2, r1]);
        let result = categorizer.categorize(&sample("KANTI RAMULU"));
        assert_eq!(result.category_id, Some(1));
    }

    #[test]
    fn unknown_assignment_field_carries_through() {
        let rule = parse(
            r#"rule "x" where amount:gt:"10000" assign risk_level:2 alert_type:"HIGH" priority 50;"#,
        )
        .unwrap();
        let categorizer = Categorizer::new(vec![rule]);
        let result = categorizer.categorize(&sample("x"));
        assert_eq!(result.field("risk_level"), Some(ScalarValue::Int(2)));
        assert_eq!(result.field("alert_type"), Some(ScalarValue::Str("HIGH".to_string())));
    }

    #[test]
    fn preexisting_field_is_never_overwritten() {
        let mut tx = sample("KANTI");
        tx.category_id = Some(5);
        let rule = parse(r#"rule "r" where entity_name:con:"KANTI" assign category_id:1;"#).unwrap();
        let categorizer = Categorizer::new(vec![rule]);
        let result = categorizer.categorize(&tx);
        assert_eq!(result.category_id, Some(5));
    }

    #[test]
    fn stable_sort_preserves_parse_order_on_priority_tie() {
        let r1 = parse(r#"rule "a" where entity_name:nnull assign category_id:1;"#).unwrap();
        let r2 = parse(r#"rule "b" where entity_name:nnull assign category_id:2;"#).unwrap();
        let categorizer = Categorizer::new(vec![r1, r2]);
        let result = categorizer.categorize(&sample("x"));
        assert_eq!(result.category_id, Some(1));
    }
}
