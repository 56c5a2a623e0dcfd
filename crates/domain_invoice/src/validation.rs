//! Local batch validation
//!
//! Runs before any network call. Each violated rule produces one message
//! indexed to the offending row; a field is reported at most once per row.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

use crate::field::{FieldKey, FieldValue};
use crate::record::{Check, InvoiceRecord, RuleScope};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    Missing,
    NotNumeric,
    MissingOrNotNumeric,
}

/// One violation on one row (0-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub field: &'static str,
    pub label: &'static str,
    pub violation: Violation,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.row + 1;
        match self.violation {
            Violation::Missing => write!(f, "Dòng {}: Thiếu {}", n, self.label),
            Violation::NotNumeric => write!(
                f,
                "Dòng {}: {} phải là số nguyên không âm hoặc để trống",
                n, self.label
            ),
            Violation::MissingOrNotNumeric => write!(
                f,
                "Dòng {}: {} phải là số và không được để trống",
                n, self.label
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<RowError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add(&mut self, error: RowError) {
        let duplicate = self
            .errors
            .iter()
            .any(|e| e.row == error.row && e.field == error.field);
        if !duplicate {
            self.errors.push(error);
        }
    }

    pub fn invalid_rows(&self) -> BTreeSet<usize> {
        self.errors.iter().map(|e| e.row).collect()
    }

    pub fn errors_for_row(&self, row: usize) -> impl Iterator<Item = &RowError> + '_ {
        self.errors.iter().filter(move |e| e.row == row)
    }

    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

fn check_value(check: Check, value: &FieldValue) -> Option<Violation> {
    match check {
        Check::Required if value.is_empty() => Some(Violation::Missing),
        Check::Numeric if !value.is_empty() && !value.is_numeric() => Some(Violation::NotNumeric),
        Check::RequiredNumeric if !value.is_numeric() => Some(Violation::MissingOrNotNumeric),
        _ => None,
    }
}

/// Applies the family's rules to every row.
///
/// `edited(row, field)` tells whether the field was edited for that row in
/// this session; it decides [`RuleScope::WhenEdited`] rules.
pub fn validate_rows<R, E>(records: &[R], edited: E) -> ValidationReport
where
    R: InvoiceRecord,
    E: Fn(usize, R::Field) -> bool,
{
    let mut report = ValidationReport::default();
    for (row, record) in records.iter().enumerate() {
        for rule in R::row_rules() {
            let applies = match rule.scope {
                RuleScope::AllRows => true,
                RuleScope::NewRows => record.is_new(),
                RuleScope::WhenEdited => edited(row, rule.field),
            };
            if !applies {
                continue;
            }
            if let Some(violation) = check_value(rule.check, &record.get(rule.field)) {
                report.add(RowError {
                    row,
                    field: rule.field.wire_name(),
                    label: rule.field.label(),
                    violation,
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardInvoice;
    use crate::momo::MomoInvoice;
    use core_kernel::{BatchId, RecordId};

    fn persisted_card(transfer_out: &str) -> CardInvoice {
        CardInvoice {
            id: RecordId::Persisted(1),
            transfer_out: transfer_out.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_card_transfer_out_is_required_and_numeric() {
        let rows = vec![persisted_card("100"), persisted_card(""), persisted_card("x")];
        let report = validate_rows(&rows, |_, _| false);
        assert_eq!(report.invalid_rows(), BTreeSet::from([1, 2]));
        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].to_string(), "Dòng 2: CK ra phải là số và không được để trống");
    }

    #[test]
    fn test_phone_checked_only_when_edited() {
        let rows = vec![persisted_card("0")];
        assert!(validate_rows(&rows, |_, _| false).is_valid());
        let report = validate_rows(&rows, |_, f| f == crate::card::CardField::Phone);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].field, "so_dien_thoai");
    }

    #[test]
    fn test_new_momo_row_requires_creation_fields() {
        let rows = vec![MomoInvoice {
            batch_id: BatchId::new("B1"),
            amount: "12a".into(),
            ..Default::default()
        }];
        let report = validate_rows(&rows, |_, _| true);
        let fields: Vec<_> = report.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["ten_khach_hang", "ma_khach_hang", "dia_chi", "thoi_gian", "ma_giao_dich", "so_tien"]
        );
    }

    #[test]
    fn test_negative_transfer_in_rejected() {
        let rows = vec![MomoInvoice {
            id: RecordId::Persisted(3),
            transfer_in: "-5".into(),
            ..Default::default()
        }];
        let report = validate_rows(&rows, |_, _| false);
        assert_eq!(report.errors[0].violation, Violation::NotNumeric);
    }
}
