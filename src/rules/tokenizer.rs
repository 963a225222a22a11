//! DSL tokenizer (SPEC_FULL.md §4.4, C4), grounded in
//! `rule_engine/tokenizer.py`. The pattern table is scanned in order at
//! the current position; order encodes the longer-keyword-first rule
//! (`gte`/`lte` before `gt`/`lt`, `nnull` before `null`, `nin` before `in`,
//! `noc` before `con`) so a shorter keyword never shadows a longer one.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::DslError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Rule,
    Where,
    And,
    Or,
    Assign,
    Priority,
    Eq,
    Neq,
    Gte,
    Lte,
    Gt,
    Lt,
    Between,
    Noc,
    Con,
    Sw,
    Ew,
    Regex,
    Nin,
    In,
    Nnull,
    Null,
    Ident(String),
    Str(String),
    Number(String),
    Colon,
    Comma,
    Semicolon,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

fn pattern_table() -> &'static Vec<(Regex, TokenKind)> {
    static TABLE: OnceLock<Vec<(Regex, TokenKind)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let raw: &[(&str, TokenKind)] = &[
            (r"^(?i)rule\b", TokenKind::Rule),
            (r"^(?i)where\b", TokenKind::Where),
            (r"^(?i)and\b", TokenKind::And),
            (r"^(?i)or\b", TokenKind::Or),
            (r"^(?i)assign\b", TokenKind::Assign),
            (r"^(?i)priority\b", TokenKind::Priority),
            // Longer-keyword-first: gte/lte before gt/lt.
            (r"^(?i)gte\b", TokenKind::Gte),
            (r"^(?i)lte\b", TokenKind::Lte),
            (r"^(?i)gt\b", TokenKind::Gt),
            (r"^(?i)lt\b", TokenKind::Lt),
            (r"^(?i)eq\b", TokenKind::Eq),
            (r"^(?i)neq\b", TokenKind::Neq),
            (r"^(?i)between\b", TokenKind::Between),
            // noc before con.
            (r"^(?i)noc\b", TokenKind::Noc),
            (r"^(?i)con\b", TokenKind::Con),
            (r"^(?i)sw\b", TokenKind::Sw),
            (r"^(?i)ew\b", TokenKind::Ew),
            (r"^(?i)regex\b", TokenKind::Regex),
            // nin before in.
            (r"^(?i)nin\b", TokenKind::Nin),
            (r"^(?i)in\b", TokenKind::In),
            // nnull before null.
            (r"^(?i)nnull\b", TokenKind::Nnull),
            (r"^(?i)null\b", TokenKind::Null),
        ];
        raw.iter()
            .map(|(pat, kind)| (Regex::new(pat).expect("valid regex"), kind.clone()))
            .collect()
    })
}

fn ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("valid regex"))
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+(\.\d+)?").expect("valid regex"))
}

fn string_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^"([^"]*)""#).expect("valid regex"))
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, DslError> {
    let mut tokens = Vec::new();
    let mut pos = 0usize;
    let bytes = source.as_bytes();

    while pos < bytes.len() {
        let remaining = &source[pos..];
        let ch = bytes[pos] as char;

        if ch.is_whitespace() {
            pos += 1;
            continue;
        }

        if ch == '#' {
            let skip = remaining.find('\n').unwrap_or(remaining.len());
            pos += skip + 1;
            continue;
        }

        if let Some(caps) = string_re().captures(remaining) {
            let value = caps.get(1).unwrap().as_str().to_string();
            let matched_len = caps.get(0).unwrap().as_str().len();
            tokens.push(Token { kind: TokenKind::Str(value), position: pos });
            pos += matched_len;
            continue;
        }

        let mut matched = false;
        for (re, kind) in pattern_table() {
            if let Some(m) = re.find(remaining) {
                tokens.push(Token { kind: kind.clone(), position: pos });
                pos += m.end();
                matched = true;
                break;
            }
        }
        if matched {
            continue;
        }

        if let Some(m) = number_re().find(remaining) {
            tokens.push(Token { kind: TokenKind::Number(m.as_str().to_string()), position: pos });
            pos += m.end();
            continue;
        }

        if let Some(m) = ident_re().find(remaining) {
            tokens.push(Token { kind: TokenKind::Ident(m.as_str().to_string()), position: pos });
            pos += m.end();
            continue;
        }

        let symbol = match ch {
            ':' => Some(TokenKind::Colon),
            ',' => Some(TokenKind::Comma),
            ';' => Some(TokenKind::Semicolon),
            _ => None,
        };
        match symbol {
            Some(kind) => {
                tokens.push(Token { kind, position: pos });
                pos += 1;
            }
            None => return Err(DslError::UnexpectedChar { position: pos, found: ch }),
        }
    }

    tokens.push(Token { kind: TokenKind::Eof, position: pos });
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_gte_before_gt() {
        let tokens = tokenize("amount:gte:\"100\"").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Gte);
    }

    #[test]
    fn tokenizes_nnull_before_null() {
        let tokens = tokenize("entity_name:nnull").unwrap();
        assert_eq!(tokens[2].kind, TokenKind::Nnull);
    }

    #[test]
    fn skips_comments_and_whitespace() {
        let tokens = tokenize("# a comment\n  rule").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Rule);
    }

    #[test]
    fn tokenizes_case_flag_as_ident() {
        let tokens = tokenize("entity_name:con:\"KANTI\":i").unwrap();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Ident("i".to_string())));
    }
}
