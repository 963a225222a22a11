//! Recursive-descent DSL parser (SPEC_FULL.md §4.5, C5), grounded in
//! `rule_engine/parser.py`. Unlike the original, the assignment grammar is
//! generalized to accept arbitrary identifiers and either NUMBER or STRING
//! values (DESIGN.md open question: assignment value types) — the original
//! restricts assignment targets to a fixed enumerated token set, but this
//! spec's own worked example (`risk_level:2 alert_type:"HIGH"`) requires
//! both dynamic targets and string-valued assignments.

use std::collections::HashMap;

use bigdecimal::BigDecimal;

use crate::errors::DslError;
use crate::models::ScalarValue;
use crate::rules::ast::{AndBlock, CategorizationRule, FilterExpression, Operator, OrBlock};
use crate::rules::tokenizer::{tokenize, Token, TokenKind};

const DEFAULT_PRIORITY: i32 = 100;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn advance(&mut self) -> Token {
        let tok = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, DslError> {
        if std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind) {
            Ok(self.advance())
        } else {
            Err(DslError::ParseError {
                position: self.peek().position,
                expected: format!("{kind:?}"),
                got: format!("{:?}", self.peek().kind),
            })
        }
    }

    fn expect_ident(&mut self) -> Result<String, DslError> {
        match self.peek().kind.clone() {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(DslError::ParseError {
                position: self.peek().position,
                expected: "identifier".to_string(),
                got: format!("{other:?}"),
            }),
        }
    }

    fn expect_string(&mut self) -> Result<String, DslError> {
        match self.peek().kind.clone() {
            TokenKind::Str(value) => {
                self.advance();
                Ok(value)
            }
            other => Err(DslError::ParseError {
                position: self.peek().position,
                expected: "string literal".to_string(),
                got: format!("{other:?}"),
            }),
        }
    }

    fn expect_number(&mut self) -> Result<String, DslError> {
        match self.peek().kind.clone() {
            TokenKind::Number(value) => {
                self.advance();
                Ok(value)
            }
            other => Err(DslError::ParseError {
                position: self.peek().position,
                expected: "number".to_string(),
                got: format!("{other:?}"),
            }),
        }
    }

    /// Peeks for a trailing `:i` case-insensitivity flag without consuming
    /// it unless present.
    fn consume_case_flag(&mut self) -> bool {
        if self.peek().kind == TokenKind::Colon {
            if let TokenKind::Ident(name) = &self.tokens[self.pos + 1].kind {
                if name == "i" {
                    self.advance();
                    self.advance();
                    return true;
                }
            }
        }
        false
    }

    fn parse_string_list(&mut self) -> Result<Vec<String>, DslError> {
        let mut values = vec![self.expect_string()?];
        while self.peek().kind == TokenKind::Comma {
            self.advance();
            values.push(self.expect_string()?);
        }
        Ok(values)
    }

    fn parse_operator(&mut self) -> Result<Operator, DslError> {
        let kind = self.advance().kind;
        let operator = match kind {
            TokenKind::Eq => {
                self.expect(&TokenKind::Colon)?;
                let value = self.expect_string()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::Eq { value, case_sensitive }
            }
            TokenKind::Neq => {
                self.expect(&TokenKind::Colon)?;
                let value = self.expect_string()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::Neq { value, case_sensitive }
            }
            TokenKind::Sw => {
                self.expect(&TokenKind::Colon)?;
                let value = self.expect_string()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::Sw { value, case_sensitive }
            }
            TokenKind::Ew => {
                self.expect(&TokenKind::Colon)?;
                let value = self.expect_string()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::Ew { value, case_sensitive }
            }
            TokenKind::Regex => {
                self.expect(&TokenKind::Colon)?;
                let pattern = self.expect_string()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::Regex { pattern, case_sensitive }
            }
            TokenKind::Gt => {
                self.expect(&TokenKind::Colon)?;
                Operator::Gt { value: self.expect_string()? }
            }
            TokenKind::Lt => {
                self.expect(&TokenKind::Colon)?;
                Operator::Lt { value: self.expect_string()? }
            }
            TokenKind::Gte => {
                self.expect(&TokenKind::Colon)?;
                Operator::Gte { value: self.expect_string()? }
            }
            TokenKind::Lte => {
                self.expect(&TokenKind::Colon)?;
                Operator::Lte { value: self.expect_string()? }
            }
            TokenKind::Between => {
                self.expect(&TokenKind::Colon)?;
                let low = self.expect_string()?;
                self.expect(&TokenKind::Colon)?;
                let high = self.expect_string()?;
                Operator::Between { low, high }
            }
            TokenKind::Con => {
                self.expect(&TokenKind::Colon)?;
                let values = self.parse_string_list()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::Con { values, case_sensitive }
            }
            TokenKind::Noc => {
                self.expect(&TokenKind::Colon)?;
                let values = self.parse_string_list()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::Noc { values, case_sensitive }
            }
            TokenKind::In => {
                self.expect(&TokenKind::Colon)?;
                let values = self.parse_string_list()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::In { values, case_sensitive }
            }
            TokenKind::Nin => {
                self.expect(&TokenKind::Colon)?;
                let values = self.parse_string_list()?;
                let case_sensitive = !self.consume_case_flag();
                Operator::Nin { values, case_sensitive }
            }
            TokenKind::Null => Operator::Null,
            TokenKind::Nnull => Operator::Nnull,
            other => {
                return Err(DslError::ParseError {
                    position: self.peek().position,
                    expected: "operator keyword".to_string(),
                    got: format!("{other:?}"),
                })
            }
        };
        Ok(operator)
    }

    fn parse_filter(&mut self) -> Result<FilterExpression, DslError> {
        let field = self.expect_ident()?;
        self.expect(&TokenKind::Colon)?;
        let operator = self.parse_operator()?;
        Ok(FilterExpression { field, operator })
    }

    fn parse_and_block(&mut self) -> Result<AndBlock, DslError> {
        let mut filters = vec![self.parse_filter()?];
        while self.peek().kind == TokenKind::And {
            self.advance();
            filters.push(self.parse_filter()?);
        }
        Ok(AndBlock(filters))
    }

    fn parse_or_block(&mut self) -> Result<OrBlock, DslError> {
        let mut blocks = vec![self.parse_and_block()?];
        while self.peek().kind == TokenKind::Or {
            self.advance();
            blocks.push(self.parse_and_block()?);
        }
        Ok(OrBlock(blocks))
    }

    fn parse_assignment_value(&mut self) -> Result<ScalarValue, DslError> {
        match self.peek().kind.clone() {
            TokenKind::Number(raw) => {
                self.advance();
                if raw.contains('.') {
                    let decimal: BigDecimal = raw.parse().map_err(|_| DslError::ParseError {
                        position: self.peek().position,
                        expected: "decimal number".to_string(),
                        got: raw.clone(),
                    })?;
                    Ok(ScalarValue::Decimal(decimal))
                } else {
                    let int: i64 = raw.parse().map_err(|_| DslError::ParseError {
                        position: self.peek().position,
                        expected: "integer".to_string(),
                        got: raw.clone(),
                    })?;
                    Ok(ScalarValue::Int(int))
                }
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(ScalarValue::Str(value))
            }
            other => Err(DslError::ParseError {
                position: self.peek().position,
                expected: "NUMBER or STRING".to_string(),
                got: format!("{other:?}"),
            }),
        }
    }

    fn parse_assignments(&mut self) -> Result<HashMap<String, ScalarValue>, DslError> {
        let mut assignments = HashMap::new();
        loop {
            let field = match self.peek().kind.clone() {
                TokenKind::Ident(name) => name,
                _ => break,
            };
            self.advance();
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_assignment_value()?;
            assignments.insert(field, value);

            if matches!(self.peek().kind, TokenKind::Ident(_)) {
                continue;
            }
            break;
        }
        if assignments.is_empty() {
            return Err(DslError::ParseError {
                position: self.peek().position,
                expected: "at least one assignment".to_string(),
                got: format!("{:?}", self.peek().kind),
            });
        }
        Ok(assignments)
    }

    fn parse_rule(&mut self) -> Result<CategorizationRule, DslError> {
        self.expect(&TokenKind::Rule)?;
        let name = self.expect_string()?;
        self.expect(&TokenKind::Where)?;
        let conditions = self.parse_or_block()?;
        self.expect(&TokenKind::Assign)?;
        let assignment = self.parse_assignments()?;

        let priority = if self.peek().kind == TokenKind::Priority {
            self.advance();
            self.expect_number()?.parse().unwrap_or(DEFAULT_PRIORITY)
        } else {
            DEFAULT_PRIORITY
        };

        self.expect(&TokenKind::Semicolon)?;

        Ok(CategorizationRule { name, conditions, assignment, priority, is_active: true })
    }
}

pub fn parse(source: &str) -> Result<CategorizationRule, DslError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    parser.parse_rule()
}

pub fn parse_multiple(source: &str) -> Result<Vec<CategorizationRule>, DslError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut rules = Vec::new();
    while parser.peek().kind != TokenKind::Eof {
        rules.push(parser.parse_rule()?);
    }
    Ok(rules)
}

fn serialize_operator(field: &str, operator: &Operator) -> String {
    fn case_suffix(case_sensitive: bool) -> &'static str {
        if case_sensitive { "" } else { ":i" }
    }
    fn quoted_list(values: &[String]) -> String {
        values.iter().map(|v| format!("\"{v}\"")).collect::<Vec<_>>().join(",")
    }

    match operator {
        Operator::Eq { value, case_sensitive } => format!("{field}:eq:\"{value}\"{}", case_suffix(*case_sensitive)),
        Operator::Neq { value, case_sensitive } => format!("{field}:neq:\"{value}\"{}", case_suffix(*case_sensitive)),
        Operator::Sw { value, case_sensitive } => format!("{field}:sw:\"{value}\"{}", case_suffix(*case_sensitive)),
        Operator::Ew { value, case_sensitive } => format!("{field}:ew:\"{value}\"{}", case_suffix(*case_sensitive)),
        Operator::Regex { pattern, case_sensitive } => {
            format!("{field}:regex:\"{pattern}\"{}", case_suffix(*case_sensitive))
        }
        Operator::Gt { value } => format!("{field}:gt:\"{value}\""),
        Operator::Lt { value } => format!("{field}:lt:\"{value}\""),
        Operator::Gte { value } => format!("{field}:gte:\"{value}\""),
        Operator::Lte { value } => format!("{field}:lte:\"{value}\""),
        Operator::Between { low, high } => format!("{field}:between:\"{low}\":\"{high}\""),
        Operator::Con { values, case_sensitive } => format!("{field}:con:{}{}", quoted_list(values), case_suffix(*case_sensitive)),
        Operator::Noc { values, case_sensitive } => format!("{field}:noc:{}{}", quoted_list(values), case_suffix(*case_sensitive)),
        Operator::In { values, case_sensitive } => format!("{field}:in:{}{}", quoted_list(values), case_suffix(*case_sensitive)),
        Operator::Nin { values, case_sensitive } => format!("{field}:nin:{}{}", quoted_list(values), case_suffix(*case_sensitive)),
        Operator::Null => format!("{field}:null"),
        Operator::Nnull => format!("{field}:nnull"),
    }
}

/// Renders an AST back to DSL source text. `parse(serialize(parse(r)))`
/// must be structurally equal to `parse(r)` (SPEC_FULL.md §8 DSL round-trip).
pub fn serialize(rule: &CategorizationRule) -> String {
    let or_clause = rule
        .conditions
        .0
        .iter()
        .map(|and_block| {
            and_block
                .0
                .iter()
                .map(|f| serialize_operator(&f.field, &f.operator))
                .collect::<Vec<_>>()
                .join(" and ")
        })
        .collect::<Vec<_>>()
        .join(" or ");

    let mut assignment_keys: Vec<&String> = rule.assignment.keys().collect();
    assignment_keys.sort();
    let assign_clause = assignment_keys
        .iter()
        .map(|k| {
            let v = &rule.assignment[*k];
            match v {
                ScalarValue::Int(n) => format!("{k}:{n}"),
                ScalarValue::Decimal(d) => format!("{k}:{d}"),
                ScalarValue::Str(s) => format!("{k}:\"{s}\""),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "rule \"{}\" where {} assign {} priority {};",
        rule.name, or_clause, assign_clause, rule.priority
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_priority_and_defaults() {
        let rule = parse(r#"rule "r1" where amount:gt:"100" assign category_id:1;"#).unwrap();
        assert_eq!(rule.priority, 100);
    }

    #[test]
    fn parses_explicit_priority() {
        let rule = parse(r#"rule "r1" where amount:gt:"100" assign category_id:1 priority 10;"#).unwrap();
        assert_eq!(rule.priority, 10);
    }

    #[test]
    fn parses_dynamic_string_valued_assignment() {
        let rule = parse(
            r#"rule "x" where amount:gt:"10000" assign risk_level:2 alert_type:"HIGH" priority 50;"#,
        )
        .unwrap();
        assert_eq!(rule.assignment.get("risk_level"), Some(&ScalarValue::Int(2)));
        assert_eq!(rule.assignment.get("alert_type"), Some(&ScalarValue::Str("HIGH".to_string())));
    }

    #[test]
    fn round_trips_through_serialize() {
        let source = r#"rule "r1" where entity_name:con:"KANTI":i assign category_id:1 priority 10;"#;
        let parsed = parse(source).unwrap();
        let rendered = serialize(&parsed);
        let reparsed = parse(&rendered).unwrap();
        assert_eq!(parsed, reparsed);
    }

    #[test]
    fn parses_or_of_and_conditions() {
        let rule = parse(
            r#"rule "r1" where a:eq:"1" and b:eq:"2" or c:eq:"3" assign category_id:1;"#,
        )
        .unwrap();
        assert_eq!(rule.conditions.0.len(), 2);
        assert_eq!(rule.conditions.0[0].0.len(), 2);
        assert_eq!(rule.conditions.0[1].0.len(), 1);
    }
}
