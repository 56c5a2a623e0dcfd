//! Custom Test Assertions
//!
//! Assertion helpers for save outcomes, validation reports and server issues
//! that print what actually came back when they fail.

use core_kernel::{PortError, ServerIssue, Vnd};
use domain_invoice::{SaveOutcome, ValidationReport, Violation};

/// Asserts that a save went through and returns the saved rows
pub fn assert_saved<R: std::fmt::Debug>(outcome: SaveOutcome<R>) -> Vec<R> {
    match outcome {
        SaveOutcome::Saved { records } => records,
        other => panic!("Expected a saved batch, got {:?}", other),
    }
}

/// Asserts that a save was rejected and that `row` carries a message containing `needle`
pub fn assert_row_rejected<R: std::fmt::Debug>(outcome: &SaveOutcome<R>, row: usize, needle: &str) {
    let SaveOutcome::Rejected { row_messages, banner } = outcome else {
        panic!("Expected a rejected batch, got {:?}", outcome);
    };
    let messages = row_messages.get(&row).cloned().unwrap_or_default();
    assert!(
        messages.iter().any(|m| m.contains(needle)),
        "Row {} has no message containing {:?}: rows={:?}, banner={:?}",
        row,
        needle,
        row_messages,
        banner
    );
}

/// Asserts that a rejection carries a banner line containing `needle`
pub fn assert_banner_contains<R: std::fmt::Debug>(outcome: &SaveOutcome<R>, needle: &str) {
    let SaveOutcome::Rejected { banner, .. } = outcome else {
        panic!("Expected a rejected batch, got {:?}", outcome);
    };
    assert!(
        banner.iter().any(|m| m.contains(needle)),
        "Banner has no line containing {:?}: {:?}",
        needle,
        banner
    );
}

/// Asserts that `field` on `row` was reported with `violation`
pub fn assert_violation(report: &ValidationReport, row: usize, field: &str, violation: Violation) {
    assert!(
        report
            .errors
            .iter()
            .any(|e| e.row == row && e.field == field && e.violation == violation),
        "Expected {:?} on row {} field {}, got {:?}",
        violation,
        row,
        field,
        report.errors
    );
}

/// Asserts that the error is a rejection carrying exactly `expected` issues
pub fn assert_issues(error: &PortError, expected: &[ServerIssue]) {
    assert!(
        matches!(error, PortError::Unprocessable { .. }),
        "Expected an unprocessable error, got {:?}",
        error
    );
    assert_eq!(error.issues(), expected, "Issue mismatch for {}", error);
}

/// Asserts that a formatted amount matches, e.g. `"1.234.567 ₫"`
pub fn assert_vnd_display(amount: Vnd, expected: &str) {
    assert_eq!(amount.to_string(), expected, "Unexpected rendering of {:?}", amount);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_assert_row_rejected_finds_message() {
        let mut rows = BTreeMap::new();
        rows.insert(1, vec!["Hóa đơn số 2: Số tiền: sai".to_string()]);
        let outcome: SaveOutcome<()> = SaveOutcome::Rejected {
            row_messages: rows,
            banner: vec![],
        };
        assert_row_rejected(&outcome, 1, "Số tiền");
    }

    #[test]
    #[should_panic(expected = "Expected a saved batch")]
    fn test_assert_saved_panics_on_stale() {
        assert_saved::<()>(SaveOutcome::Stale);
    }
}
