//! Rule evaluator (SPEC_FULL.md §4.6, C6), grounded in
//! `rule_engine/evaluator.py::RuleEvaluator`. Dispatch on `Operator` is a
//! single exhaustive match, so the compiler enforces coverage of every
//! operator shape (SPEC_FULL.md §9).

use bigdecimal::BigDecimal;
use regex::RegexBuilder;

use crate::models::{ScalarValue, TransactionFields};
use crate::rules::ast::{AndBlock, CategorizationRule, FilterExpression, OrBlock, Operator};

fn eq_ignore_case(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.eq_ignore_ascii_case(b)
    }
}

fn contains_any(haystack: &str, needles: &[String], case_sensitive: bool) -> bool {
    if case_sensitive {
        needles.iter().any(|n| haystack.contains(n.as_str()))
    } else {
        let haystack = haystack.to_lowercase();
        needles.iter().any(|n| haystack.contains(&n.to_lowercase()))
    }
}

fn in_list(value: &str, values: &[String], case_sensitive: bool) -> bool {
    if case_sensitive {
        values.iter().any(|v| v == value)
    } else {
        values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }
}

/// Attempts a decimal comparison of both sides; falls back to lexicographic
/// string comparison when either side isn't a valid decimal (SPEC_FULL.md
/// §4.6: comparison operators).
fn compare_values(field_value: &str, operand: &str) -> std::cmp::Ordering {
    let parsed: Option<(BigDecimal, BigDecimal)> = field_value
        .parse::<BigDecimal>()
        .ok()
        .zip(operand.parse::<BigDecimal>().ok());
    match parsed {
        Some((a, b)) => a.cmp(&b),
        None => field_value.cmp(operand),
    }
}

fn is_empty_sentinel(value: &Option<ScalarValue>) -> bool {
    match value {
        None => true,
        Some(ScalarValue::Str(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn evaluate_filter(filter: &FilterExpression, tx: &dyn TransactionFields) -> bool {
    let field_value = tx.field(&filter.field);

    match &filter.operator {
        Operator::Null => is_empty_sentinel(&field_value),
        Operator::Nnull => !is_empty_sentinel(&field_value),
        _ => {
            let Some(field_value) = field_value else { return false };
            let field_str = field_value.as_str_lossy();

            match &filter.operator {
                Operator::Eq { value, case_sensitive } => eq_ignore_case(&field_str, value, *case_sensitive),
                Operator::Neq { value, case_sensitive } => !eq_ignore_case(&field_str, value, *case_sensitive),
                Operator::Sw { value, case_sensitive } => {
                    if *case_sensitive {
                        field_str.starts_with(value.as_str())
                    } else {
                        field_str.to_lowercase().starts_with(&value.to_lowercase())
                    }
                }
                Operator::Ew { value, case_sensitive } => {
                    if *case_sensitive {
                        field_str.ends_with(value.as_str())
                    } else {
                        field_str.to_lowercase().ends_with(&value.to_lowercase())
                    }
                }
                Operator::Regex { pattern, case_sensitive } => RegexBuilder::new(pattern)
                    .case_insensitive(!case_sensitive)
                    .build()
                    .map(|re| re.is_match(&field_str))
                    .unwrap_or(false),
                Operator::Gt { value } => compare_values(&field_str, value).is_gt(),
                Operator::Lt { value } => compare_values(&field_str, value).is_lt(),
                Operator::Gte { value } => compare_values(&field_str, value).is_ge(),
                Operator::Lte { value } => compare_values(&field_str, value).is_le(),
                Operator::Between { low, high } => {
                    compare_values(&field_str, low).is_ge() && compare_values(&field_str, high).is_le()
                }
                Operator::Con { values, case_sensitive } => contains_any(&field_str, values, *case_sensitive),
                Operator::Noc { values, case_sensitive } => !contains_any(&field_str, values, *case_sensitive),
                Operator::In { values, case_sensitive } => in_list(&field_str, values, *case_sensitive),
                Operator::Nin { values, case_sensitive } => !in_list(&field_str, values, *case_sensitive),
                Operator::Null | Operator::Nnull => unreachable!("handled above"),
            }
        }
    }
}

fn evaluate_and_block(block: &AndBlock, tx: &dyn TransactionFields) -> bool {
    block.0.iter().all(|f| evaluate_filter(f, tx))
}

fn evaluate_or_block(block: &OrBlock, tx: &dyn TransactionFields) -> bool {
    block.0.iter().any(|b| evaluate_and_block(b, tx))
}

/// `false` immediately if the rule is inactive; otherwise true iff any
/// AND-block's conjunction of filters all evaluate true.
pub fn evaluate_rule(rule: &CategorizationRule, tx: &dyn TransactionFields) -> bool {
    if !rule.is_active {
        return false;
    }
    evaluate_or_block(&rule.conditions, tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::parser::parse;
    use std::collections::HashMap;

    use crate::models::{Direction, Transaction};
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample(entity: &str, amount: &str) -> Transaction {
        Transaction {
            user_id: Uuid::nil(),
            bank_account_id: Uuid::nil(),
            transaction_date: NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
            description: "UPI/DR/1/x".to_string(),
            entity_name: Some(entity.to_string()),
            amount: amount.parse::<BigDecimal>().unwrap(),
            currency: "INR".to_string(),
            direction: Direction::Debit,
            payment_method: Some("UPI".to_string()),
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
    fn con_matches_case_insensitively_when_flagged() {
        let rule = parse(r#"rule "r" where entity_name:con:"kanti":i assign category_id:1;"#).unwrap();
        let tx = sample("KANTI RAMULU", "100");
        assert!(evaluate_rule(&rule, &tx));
    }

    #[test]
    fn gt_falls_back_to_lexicographic_when_not_decimal() {
        let rule = parse(r#"rule "r" where entity_name:gt:"AAA" assign category_id:1;"#).unwrap();
        let tx = sample("ZZZ", "100");
        assert!(evaluate_rule(&rule, &tx));
    }

    #[test]
    fn gt_compares_numerically_when_both_sides_parse() {
        let rule = parse(r#"rule "r" where amount:gt:"50" assign category_id:1;"#).unwrap();
        assert!(evaluate_rule(&rule, &sample("x", "100")));
        assert!(!evaluate_rule(&rule, &sample("x", "10")));
    }

    #[test]
    fn missing_field_fails_non_null_operators() {
        let rule = parse(r#"rule "r" where payment_method_id:eq:"1" assign category_id:1;"#).unwrap();
        assert!(!evaluate_rule(&rule, &sample("x", "100")));
    }

    #[test]
    fn nnull_true_for_present_field() {
        let rule = parse(r#"rule "r" where entity_name:nnull assign category_id:1;"#).unwrap();
        assert!(evaluate_rule(&rule, &sample("x", "100")));
    }

    #[test]
    fn null_true_for_absent_field() {
        let rule = parse(r#"rule "r" where payment_method_id:null assign category_id:1;"#).unwrap();
        assert!(evaluate_rule(&rule, &sample("x", "100")));
    }

    #[test]
    fn between_is_inclusive() {
        let rule = parse(r#"rule "r" where amount:between:"100":"100" assign category_id:1;"#).unwrap();
        assert!(evaluate_rule(&rule, &sample("x", "100")));
    }

    #[test]
    fn inactive_rule_never_matches() {
        let mut rule = parse(r#"rule "r" where amount:gt:"0" assign category_id:1;"#).unwrap();
        rule.is_active = false;
        assert!(!evaluate_rule(&rule, &sample("x", "100")));
    }
}
