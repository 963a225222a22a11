//! End-to-end scenarios strung across the row reconstructor, a real bank
//! extractor, and the categorizer without a database, grounded in the
//! worked examples in the ingestion and rule-engine specs. The lib/bin
//! split exists so these tests can reach into crate internals directly
//! rather than re-deriving the logic inline.

use statement_ledger_backend::models::{ScalarValue, TransactionFields};
use statement_ledger_backend::pdf::access::{PdfAccess, TableGrid};
use statement_ledger_backend::pdf::extractors::{Extractor, ExtractorRegistry, HdfcExtractor};
use statement_ledger_backend::pdf::reconstruct::reconstruct_rows;
use statement_ledger_backend::rules::categorizer::Categorizer;
use statement_ledger_backend::rules::parser::parse;

struct NoAccess;

impl PdfAccess for NoAccess {
    fn page_count(&self) -> usize {
        1
    }

    fn header_text(&self, _pages: usize) -> String {
        String::new()
    }

    fn tables(&self) -> Vec<TableGrid> {
        Vec::new()
    }

    fn is_password_protected(&self) -> bool {
        false
    }
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

/// UPI debit narration carries its own direction, entity and reference
/// columns; the extractor must assemble all four consistently.
#[test]
fn upi_debit_narration_produces_a_fully_populated_transaction() {
    let table = vec![
        row(&["Date", "Narration", "Ref No.", "Withdrawal Amt", "Balance"]),
        row(&[
            "01-11-25",
            "UPI/DR/531715436912/KANTI RAMULU GA/KKBK/Ph",
            "531715436912",
            "500.00",
            "72,500.00",
        ]),
    ];

    let logical_rows = reconstruct_rows(&[table]);
    assert_eq!(logical_rows.len(), 1);

    let transactions = HdfcExtractor.parse_rows(&logical_rows, &NoAccess);
    assert_eq!(transactions.len(), 1);

    let tx = &transactions[0];
    assert_eq!(tx.transaction_date.to_string(), "2025-11-01");
    assert_eq!(tx.amount, "500.00".parse().unwrap());
    assert_eq!(tx.direction.as_str(), "debit");
    assert_eq!(tx.entity_name.as_deref(), Some("KANTI RAMULU GA"));
    assert_eq!(tx.payment_method.as_deref(), Some("UPI"));
    assert_eq!(tx.reference_id.as_deref(), Some("531715436912"));
}

/// A narration wrapped onto a continuation row (no date in its date
/// column) must be merged before the extractor ever sees it, or the
/// description would be truncated and the entity extraction would miss.
#[test]
fn wrapped_narration_is_merged_before_extraction() {
    let table = vec![
        row(&["Date", "Narration", "Ref No.", "Withdrawal Amt", "Balance"]),
        row(&[
            "20-11-2025",
            "UPI/DR/276509066224/NISHANT KANTI G/Payment from",
            "276509066224",
            "20,000.00",
            "73,179.26",
        ]),
        row(&["", "Ph", "", "", ""]),
    ];

    let logical_rows = reconstruct_rows(&[table]);
    assert_eq!(logical_rows.len(), 1);
    assert_eq!(logical_rows[0][1], "UPI/DR/276509066224/NISHANT KANTI G/Payment from Ph");

    let transactions = HdfcExtractor.parse_rows(&logical_rows, &NoAccess);
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].entity_name.as_deref(), Some("NISHANT KANTI G"));
}

/// A missing amount cell (continuation-only row slipped through as its
/// own data row) carries forward the last seen amount/direction rather
/// than producing a zeroed-out transaction.
#[test]
fn missing_amount_cell_carries_forward_the_previous_value() {
    let table = vec![
        row(&["Date", "Narration", "Ref No.", "Withdrawal Amt", "Balance"]),
        row(&["01-11-2025", "UPI/DR/1/ENTITY A/Bank/Ph", "1", "250.00", "1,000.00"]),
        row(&["02-11-2025", "Interest credited", "", "", "1,250.00"]),
    ];

    let logical_rows = reconstruct_rows(&[table]);
    assert_eq!(logical_rows.len(), 2);

    let transactions = HdfcExtractor.parse_rows(&logical_rows, &NoAccess);
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[1].amount, "250.00".parse().unwrap());
}

/// A sender-email hint for a bank the registry knows must win even when
/// the header text would otherwise detect a different bank.
#[test]
fn bank_hint_from_email_overrides_content_detection() {
    let registry = ExtractorRegistry::default();
    let extractor = registry.resolve(Some("HDFC"), "Statement from KOTAK MAHINDRA BANK").unwrap();
    assert_eq!(extractor.bank_name(), "HDFC");
}

#[test]
fn content_detection_is_used_when_no_hint_matches() {
    let registry = ExtractorRegistry::default();
    let extractor = registry.resolve(None, "HDFC BANK statement of account").unwrap();
    assert_eq!(extractor.bank_name(), "HDFC");
}

/// A rule assigning an unrecognized field name still lands on the
/// categorized transaction's dynamic extras, and a higher-priority rule's
/// assignment is never clobbered by a lower-priority one touching the
/// same field, even when both come from a real extracted transaction
/// rather than a hand-built fixture.
#[test]
fn rule_priority_and_dynamic_fields_apply_over_an_extracted_transaction() {
    let table = vec![
        row(&["Date", "Narration", "Ref No.", "Withdrawal Amt", "Balance"]),
        row(&[
            "01-11-25",
            "UPI/DR/531715436912/KANTI RAMULU GA/KKBK/Ph",
            "531715436912",
            "500.00",
            "72,500.00",
        ]),
    ];
    let logical_rows = reconstruct_rows(&[table]);
    let mut transactions = HdfcExtractor.parse_rows(&logical_rows, &NoAccess);
    let tx = transactions.remove(0);

    let low_priority = parse(r#"rule "catch-all" where entity_name:nnull assign category_id:1 priority 100;"#).unwrap();
    let high_priority = parse(
        r#"rule "kanti" where entity_name:con:"KANTI":i assign category_id:7 risk_note:"reviewed" priority 10;"#,
    )
    .unwrap();

    let categorizer = Categorizer::new(vec![low_priority, high_priority]);
    let result = categorizer.categorize(&tx);

    assert_eq!(result.category_id, Some(7));
    assert_eq!(result.field("risk_note"), Some(ScalarValue::Str("reviewed".to_string())));
}
