//! Tabular row reconstructor (SPEC_FULL.md §4.1, C1). Merges PDF table rows
//! that wrap long narration across multiple visual rows into logical
//! transaction rows, keyed on a detected date column. Pure and testable
//! against mock `TableGrid`s — no PDF access required.

use std::sync::OnceLock;

use regex::Regex;

use crate::pdf::access::TableGrid;

fn date_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{2}(\d{2})?$").expect("valid regex"))
}

/// Scans the first three rows of a table for a cell whose lowercased text
/// contains "date"; returns its column index.
fn find_date_column(table: &TableGrid) -> Option<usize> {
    for row in table.iter().take(3) {
        for (idx, cell) in row.iter().enumerate() {
            if cell.to_lowercase().contains("date") {
                return Some(idx);
            }
        }
    }
    None
}

fn normalize_cell(raw: &str) -> String {
    raw.split('\n')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn is_data_row(row: &[String], date_col: usize) -> bool {
    row.get(date_col)
        .map(|cell| date_shape().is_match(cell.trim()))
        .unwrap_or(false)
}

fn merge_cell(pending: &mut String, addition: &str) {
    let addition = addition.trim();
    if addition.is_empty() {
        return;
    }
    if pending.is_empty() {
        *pending = addition.to_string();
    } else {
        pending.push(' ');
        pending.push_str(addition);
    }
}

/// Reconstructs logical rows across all given tables, discarding any table
/// with no detectable date header. Rows are returned in table/page order.
pub fn reconstruct_rows(tables: &[TableGrid]) -> Vec<Vec<String>> {
    let mut logical_rows = Vec::new();

    for table in tables {
        let date_col = match find_date_column(table) {
            Some(col) => col,
            None => continue,
        };

        let mut pending: Option<Vec<String>> = None;

        // Skip the header row itself: it was found within rows[0..3], but
        // we don't know its exact index without re-scanning, so detect it
        // the same way and skip while it still looks like the header.
        let mut started = false;
        for row in table.iter() {
            let normalized: Vec<String> = row.iter().map(|c| normalize_cell(c)).collect();

            if !started {
                // The header row itself contains "date" in the date column;
                // everything up to and including it is skipped.
                started = true;
                if row
                    .get(date_col)
                    .map(|c| c.to_lowercase().contains("date"))
                    .unwrap_or(false)
                {
                    continue;
                }
            }

            if is_blank_row(&normalized) {
                continue;
            }

            if is_data_row(&normalized, date_col) {
                if let Some(done) = pending.take() {
                    logical_rows.push(done);
                }
                pending = Some(normalized);
            } else if let Some(ref mut p) = pending {
                for (idx, cell) in normalized.iter().enumerate() {
                    if idx >= p.len() {
                        p.push(cell.clone());
                    } else {
                        merge_cell(&mut p[idx], cell);
                    }
                }
            }
            // A continuation row with no pending row (shouldn't happen for
            // well-formed tables) is silently dropped.
        }

        if let Some(done) = pending.take() {
            logical_rows.push(done);
        }
    }

    logical_rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn discards_table_without_date_header() {
        let table = vec![row(&["Ref", "Desc", "Amount"]), row(&["1", "x", "10"])];
        assert!(reconstruct_rows(&[table]).is_empty());
    }

    #[test]
    fn merges_wrapped_continuation_row() {
        let table = vec![
            row(&["Date", "Description", "Amount", "Balance"]),
            row(&["20-11-2025", "UPI/NISHANT KANTI G/276509066224/Payment from", "20,000.00", "73,179.26"]),
            row(&["", "Ph", "", ""]),
        ];
        let rows = reconstruct_rows(&[table]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], "UPI/NISHANT KANTI G/276509066224/Payment from Ph");
    }

    #[test]
    fn emits_one_logical_row_per_data_row() {
        let table = vec![
            row(&["Date", "Description", "Amount"]),
            row(&["01-11-2025", "first", "10"]),
            row(&["02-11-2025", "second", "20"]),
            row(&["03-11-2025", "third", "30"]),
        ];
        assert_eq!(reconstruct_rows(&[table]).len(), 3);
    }

    #[test]
    fn skips_blank_rows_without_disturbing_pending() {
        let table = vec![
            row(&["Date", "Description", "Amount"]),
            row(&["01-11-2025", "first", "10"]),
            row(&["", "", ""]),
            row(&["02-11-2025", "second", "20"]),
        ];
        assert_eq!(reconstruct_rows(&[table]).len(), 2);
    }
}
