//! Read-only rendering of record values

use core_kernel::format_for_display;

use crate::field::{FieldValue, StatusFlag};
use crate::record::InvoiceRecord;

/// Shows only the last four characters of a card or account number
pub fn mask_number(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return String::new();
    }
    let tail: String = {
        let chars: Vec<char> = value.chars().collect();
        chars[chars.len().saturating_sub(4)..].iter().collect()
    };
    format!("**** {}", tail)
}

/// Renders a value for a table cell.
///
/// Amounts are grouped as VND when they parse, timestamps are shifted to the
/// display timezone, flags are spelled out.
pub fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Empty => String::new(),
        FieldValue::Text(t) => t.clone(),
        FieldValue::Amount(a) => match a.parse() {
            Ok(Some(vnd)) => vnd.to_string(),
            _ => a.as_str().to_string(),
        },
        FieldValue::TxType(t) => t.label().to_string(),
        FieldValue::Flag(StatusFlag::True) | FieldValue::Bool(true) => "Có".to_string(),
        FieldValue::Flag(StatusFlag::False) | FieldValue::Bool(false) => "Không".to_string(),
        FieldValue::Timestamp(ts) => format_for_display(*ts),
    }
}

/// Renders one field of a record, masking sensitive numbers
pub fn render_field<R: InvoiceRecord>(record: &R, field: R::Field) -> String {
    let value = record.get(field);
    if R::masked_fields().contains(&field) {
        return mask_number(&value.to_string());
    }
    render_value(&value)
}
