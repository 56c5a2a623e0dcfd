//! Invoices due for settlement
//!
//! The backend returns calendar events; the screen groups them by due date
//! and then by sender.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shown in place of a missing sender
pub const UNKNOWN_SENDER: &str = "Không rõ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueInvoice {
    pub id: serde_json::Value,
    #[serde(default)]
    pub title: String,
    /// Due date
    pub start: NaiveDate,
    #[serde(rename = "nguoi_gui", default)]
    pub sender: Option<String>,
    #[serde(rename = "ten_khach", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "so_dien_thoai", default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(rename = "thoi_gian", default)]
    pub sent_at: Option<String>,
}

impl DueInvoice {
    pub fn sender_label(&self) -> &str {
        match self.sender.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => UNKNOWN_SENDER,
        }
    }
}

/// Due invoices keyed by date, then by sender label
pub type DueCalendar = BTreeMap<NaiveDate, BTreeMap<String, Vec<DueInvoice>>>;

pub fn group_by_due_date(invoices: Vec<DueInvoice>) -> DueCalendar {
    let mut calendar = DueCalendar::new();
    for invoice in invoices {
        calendar
            .entry(invoice.start)
            .or_default()
            .entry(invoice.sender_label().to_string())
            .or_default()
            .push(invoice);
    }
    calendar
}

/// Number of invoices due on each date
pub fn counts_by_date(calendar: &DueCalendar) -> BTreeMap<NaiveDate, usize> {
    calendar
        .iter()
        .map(|(date, senders)| (*date, senders.values().map(Vec::len).sum()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_date_then_sender() {
        let json = r#"[
            {"id": 1, "title": "HD 1", "start": "2024-05-02", "nguoi_gui": "Lan"},
            {"id": 2, "title": "HD 2", "start": "2024-05-02"},
            {"id": "3", "title": "HD 3", "start": "2024-05-01", "nguoi_gui": "  "},
            {"id": 4, "title": "HD 4", "start": "2024-05-02", "nguoi_gui": "Lan"}
        ]"#;
        let invoices: Vec<DueInvoice> = serde_json::from_str(json).unwrap();
        let calendar = group_by_due_date(invoices);

        let may2 = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(calendar[&may2]["Lan"].len(), 2);
        assert_eq!(calendar[&may2][UNKNOWN_SENDER].len(), 1);

        let counts = counts_by_date(&calendar);
        assert_eq!(counts.values().copied().collect::<Vec<_>>(), vec![1, 3]);
    }
}
