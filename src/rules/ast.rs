//! Rule AST, grounded in `rule_engine/ast_nodes.py`. Operator variants are
//! modeled as one tagged enum rather than a class per operator — the
//! evaluator's dispatch becomes a single exhaustive match (SPEC_FULL.md §9).

use std::collections::HashMap;

use crate::models::ScalarValue;

#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    Eq { value: String, case_sensitive: bool },
    Neq { value: String, case_sensitive: bool },
    Gt { value: String },
    Lt { value: String },
    Gte { value: String },
    Lte { value: String },
    Between { low: String, high: String },
    Con { values: Vec<String>, case_sensitive: bool },
    Noc { values: Vec<String>, case_sensitive: bool },
    Sw { value: String, case_sensitive: bool },
    Ew { value: String, case_sensitive: bool },
    Regex { pattern: String, case_sensitive: bool },
    In { values: Vec<String>, case_sensitive: bool },
    Nin { values: Vec<String>, case_sensitive: bool },
    Null,
    Nnull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    pub field: String,
    pub operator: Operator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AndBlock(pub Vec<FilterExpression>);

#[derive(Debug, Clone, PartialEq)]
pub struct OrBlock(pub Vec<AndBlock>);

#[derive(Debug, Clone, PartialEq)]
pub struct CategorizationRule {
    pub name: String,
    pub conditions: OrBlock,
    pub assignment: HashMap<String, ScalarValue>,
    pub priority: i32,
    pub is_active: bool,
}
