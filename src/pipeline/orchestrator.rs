//! The Pipeline Orchestrator (C8), grounded in
//! `tasks/bank_statement_upload.py::process_bank_pdf` and
//! `tasks/rule_engine_task.py::run_rule_engine`. Both entry points share
//! the rule-fetch/parse/categorize/upsert tail (SPEC_FULL.md §4.8); they
//! differ only in how they source the transaction batch.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{bank_account_queries, credential_queries, retry, rule_queries, transaction_queries, user_queries};
use crate::models::Transaction;
use crate::pdf::access::{LopdfAccess, PdfAccess, PdfAccessError};
use crate::pdf::extractors::{AccountDetails, ExtractorRegistry};
use crate::pdf::reconstruct::reconstruct_rows;
use crate::pipeline::credential::CredentialCipher;
use crate::rules::ast::CategorizationRule;
use crate::rules::categorizer::Categorizer;
use crate::rules::parser::parse;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unknown or inactive recipient: {0}")]
    UnknownRecipient(String),
    #[error("pdf requires a password that is not on file")]
    PasswordMissing,
    #[error("pdf password on file did not unlock the document")]
    BadPassword,
    #[error("could not determine issuing bank")]
    UnsupportedBank,
    #[error("no account details could be parsed from the statement header")]
    MissingAccountDetails,
    #[error("extractor produced zero transactions from a non-empty table set")]
    EmptyExtraction,
    #[error("pdf access error: {0}")]
    PdfAccess(#[from] PdfAccessError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

/// Maps a sender email to a bank-name hint, grounded in
/// `common/enums.py::BANK_EMAIL_PATTERNS` / `pdf_normalizer/utils.py::get_bank_from_email`.
/// Only banks this crate has an extractor for return `Some`; the rest fall
/// through to content detection (or `UnsupportedBank`), matching the
/// documented behavior in SPEC_FULL.md §4.3.
pub fn bank_hint_from_email(sender_email: &str) -> Option<&'static str> {
    let email = sender_email.to_lowercase();
    const PATTERNS: &[(&str, &str)] = &[
        ("union", "unionbank"),
        ("kotak", "kotak"),
        ("sbi", "sbi"),
        ("hdfc", "hdfc"),
    ];
    PATTERNS.iter().find(|(_, needle)| email.contains(needle)).map(|(bank, _)| *bank)
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineSummary {
    pub inserted: usize,
    pub failed: usize,
    pub errors: Vec<transaction_queries::UpsertError>,
    pub account_details: AccountDetails,
    pub transaction_count: usize,
}

fn parse_rules(rows: Vec<crate::models::RuleRow>) -> Vec<CategorizationRule> {
    let mut rules = Vec::with_capacity(rows.len());
    for row in rows {
        match parse(&row.dsl_text) {
            Ok(mut rule) => {
                rule.priority = row.priority;
                rules.push(rule);
            }
            Err(err) => {
                tracing::warn!(rule_id = row.id, error = %err, "failed to parse rule, skipping");
            }
        }
    }
    rules
}

/// `process_bank_pdf`: unlock -> detect -> extract -> categorize -> upsert.
pub async fn process_bank_pdf(
    pool: &PgPool,
    cipher: &CredentialCipher,
    registry: &ExtractorRegistry,
    upsert_chunk_size: usize,
    staged_path: &str,
    filename: &str,
    from_email: &str,
    to_email: &str,
) -> Result<PipelineSummary, PipelineError> {
    let mut conn = pool.acquire().await?;

    // A recipient lookup is the first round-trip of the task; a transient
    // connection error here shouldn't fail the whole run (SPEC_FULL.md §7).
    let user = retry::with_retry(&mut *conn, |c| Box::pin(user_queries::find_active_by_email(c, to_email)))
        .await?
        .ok_or_else(|| PipelineError::UnknownRecipient(to_email.to_string()))?;

    let probe = LopdfAccess::open(staged_path)?;
    let access: Box<dyn PdfAccess> = if probe.is_password_protected() {
        let credential = credential_queries::find_password(&mut conn, user.id, from_email, filename)
            .await?
            .ok_or(PipelineError::PasswordMissing)?;
        let password = cipher.decrypt(&credential.encrypted_password).map_err(|_| PipelineError::BadPassword)?;
        Box::new(LopdfAccess::unlock(staged_path, &password)?)
    } else {
        Box::new(probe)
    };

    let header_text = access.header_text(3);
    let hint = bank_hint_from_email(from_email);
    let extractor = registry
        .resolve(hint, &header_text)
        .map_err(|_| PipelineError::UnsupportedBank)?;

    let account_details = extractor.parse_account_details(&header_text);
    let number = account_details.number.clone().ok_or(PipelineError::MissingAccountDetails)?;
    let bank_account = retry::with_retry(&mut *conn, |c| {
        Box::pin(bank_account_queries::get_or_create(
            c,
            user.id,
            &number,
            account_details.ifsc_code.as_deref(),
            account_details.account_type,
        ))
    })
    .await?;

    let tables = access.tables();
    let logical_rows = reconstruct_rows(&tables);
    let mut transactions = extractor.parse_rows(&logical_rows, access.as_ref());
    if transactions.is_empty() && !tables.is_empty() {
        return Err(PipelineError::EmptyExtraction);
    }

    let rule_rows = rule_queries::fetch_for_account(&mut conn, user.id, bank_account.id).await?;
    let rules = parse_rules(rule_rows);
    let categorizer = Categorizer::new(rules);

    for tx in transactions.iter_mut() {
        tx.user_id = user.id;
        tx.bank_account_id = bank_account.id;
        tx.normalize_reference_id();
    }
    let transactions: Vec<Transaction> = transactions
        .into_iter()
        .map(|tx| categorizer.categorize(&tx))
        .collect();

    let stats = transaction_queries::bulk_upsert(&mut conn, &transactions, upsert_chunk_size).await;

    Ok(PipelineSummary {
        inserted: stats.inserted,
        failed: stats.failed,
        errors: stats.errors,
        account_details,
        transaction_count: transactions.len(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleEngineSummary {
    pub count: usize,
    pub inserted: usize,
    pub failed: usize,
    pub errors: Vec<transaction_queries::UpsertError>,
}

/// `run_rule_engine`: re-categorize already-persisted transactions.
pub async fn run_rule_engine(
    pool: &PgPool,
    upsert_chunk_size: usize,
    user_email: &str,
    bank_account_id: Option<Uuid>,
    from_date: Option<NaiveDate>,
    to_date: Option<NaiveDate>,
    rule_ids: Option<&[i64]>,
) -> Result<RuleEngineSummary, PipelineError> {
    let mut conn = pool.acquire().await?;

    let user = user_queries::find_active_by_email(&mut conn, user_email)
        .await?
        .ok_or_else(|| PipelineError::UnknownRecipient(user_email.to_string()))?;

    let transactions =
        transaction_queries::fetch_for_rule_engine(&mut conn, user.id, bank_account_id, from_date, to_date).await?;

    if transactions.is_empty() {
        return Ok(RuleEngineSummary { count: 0, inserted: 0, failed: 0, errors: Vec::new() });
    }

    let rule_rows = rule_queries::fetch_for_rule_engine(&mut conn, user.id, bank_account_id, rule_ids).await?;
    let rules = parse_rules(rule_rows);
    let categorizer = Categorizer::new(rules);

    let recategorized: Vec<Transaction> = transactions.iter().map(|tx| categorizer.categorize(tx)).collect();

    let stats = transaction_queries::bulk_upsert(&mut conn, &recategorized, upsert_chunk_size).await;

    Ok(RuleEngineSummary {
        count: recategorized.len(),
        inserted: stats.inserted,
        failed: stats.failed,
        errors: stats.errors,
    })
}
