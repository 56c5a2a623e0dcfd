//! Dashboard filters
//!
//! Each family has its own filter form. Empty values are left out of the
//! query string entirely.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::card::CardInvoice;
use crate::momo::MomoInvoice;
use crate::offset::OffsetInvoice;

/// A family's filter form
pub trait InvoiceFilter<R>: Clone + Default + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Non-empty filter values as query pairs, in a stable order
    fn to_query(&self) -> Vec<(&'static str, String)>;

    /// In-memory equivalent of the backend's filtering
    fn matches(&self, record: &R) -> bool;

    fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }
}

fn push(query: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        query.push((key, v.to_string()));
    }
}

fn push_date(query: &mut Vec<(&'static str, String)>, key: &'static str, value: &Option<NaiveDate>) {
    if let Some(date) = value {
        query.push((key, date.format("%Y-%m-%d").to_string()));
    }
}

/// Case-insensitive substring match; an unset filter matches everything
fn contains(filter: &Option<String>, value: Option<&str>) -> bool {
    match filter.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
        None => true,
        Some(needle) => value
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

fn within(from: &Option<NaiveDate>, to: &Option<NaiveDate>, day: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(day) = day else {
        return false;
    };
    from.map_or(true, |f| day >= f) && to.map_or(true, |t| day <= t)
}

fn local_day(ts: Option<chrono::DateTime<chrono::Utc>>) -> Option<NaiveDate> {
    ts.map(|t| core_kernel::to_display_timezone(t).date())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    pub invoice_number: Option<String>,
    pub lot_number: Option<String>,
    pub terminal_id: Option<String>,
    pub merchant_id: Option<String>,
    pub sender: Option<String>,
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub transaction_date: Option<String>,
}

impl InvoiceFilter<CardInvoice> for CardFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        push(&mut q, "so_hoa_don", &self.invoice_number);
        push(&mut q, "so_lo", &self.lot_number);
        push(&mut q, "tid", &self.terminal_id);
        push(&mut q, "mid", &self.merchant_id);
        push(&mut q, "nguoi_gui", &self.sender);
        push(&mut q, "ten_khach", &self.customer_name);
        push(&mut q, "so_dien_thoai", &self.phone);
        push(&mut q, "ngay_giao_dich", &self.transaction_date);
        q
    }

    fn matches(&self, r: &CardInvoice) -> bool {
        contains(&self.invoice_number, r.invoice_number.as_deref())
            && contains(&self.lot_number, r.lot_number.as_deref())
            && contains(&self.terminal_id, r.terminal_id.as_deref())
            && contains(&self.merchant_id, r.merchant_id.as_deref())
            && contains(&self.sender, r.sender.as_deref())
            && contains(&self.customer_name, r.customer_name.as_deref())
            && contains(&self.phone, r.phone.as_deref())
            && contains(&self.transaction_date, r.transaction_date.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MomoFilter {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub transaction_code: Option<String>,
    pub zalo_name: Option<String>,
    pub sender: Option<String>,
    pub customer_code: Option<String>,
}

impl InvoiceFilter<MomoInvoice> for MomoFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        push_date(&mut q, "from_date", &self.from_date);
        push_date(&mut q, "to_date", &self.to_date);
        push(&mut q, "ma_giao_dich", &self.transaction_code);
        push(&mut q, "ten_zalo", &self.zalo_name);
        push(&mut q, "nguoi_gui", &self.sender);
        push(&mut q, "ma_khach_hang", &self.customer_code);
        q
    }

    fn matches(&self, r: &MomoInvoice) -> bool {
        within(&self.from_date, &self.to_date, local_day(r.sent_at))
            && contains(&self.transaction_code, r.transaction_code.as_deref())
            && contains(&self.zalo_name, r.zalo_name.as_deref())
            && contains(&self.sender, r.sender.as_deref())
            && contains(&self.customer_code, r.customer_code.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetFilter {
    pub customer_name: Option<String>,
    pub customer_code: Option<String>,
    pub partner: Option<String>,
    pub sender: Option<String>,
    pub transaction_code: Option<String>,
    pub provider: Option<String>,
    pub state: Option<String>,
    pub billing_period: Option<String>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Free-text search across names and codes
    pub search: Option<String>,
}

impl InvoiceFilter<OffsetInvoice> for OffsetFilter {
    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        push(&mut q, "ten_khach_hang", &self.customer_name);
        push(&mut q, "ma_khach_hang", &self.customer_code);
        push(&mut q, "doi_tac", &self.partner);
        push(&mut q, "nguoi_gui", &self.sender);
        push(&mut q, "ma_giao_dich", &self.transaction_code);
        push(&mut q, "nha_cung_cap", &self.provider);
        push(&mut q, "trang_thai", &self.state);
        push(&mut q, "ky_thanh_toan", &self.billing_period);
        push_date(&mut q, "from_date", &self.from_date);
        push_date(&mut q, "to_date", &self.to_date);
        push(&mut q, "search", &self.search);
        q
    }

    fn matches(&self, r: &OffsetInvoice) -> bool {
        let searched = contains(&self.search, r.customer_name.as_deref())
            || contains(&self.search, r.customer_code.as_deref())
            || contains(&self.search, r.transaction_code.as_deref());
        searched
            && contains(&self.customer_name, r.customer_name.as_deref())
            && contains(&self.customer_code, r.customer_code.as_deref())
            && contains(&self.partner, r.partner.as_deref())
            && contains(&self.sender, r.sender.as_deref())
            && contains(&self.transaction_code, r.transaction_code.as_deref())
            && contains(&self.provider, r.provider.as_deref())
            && contains(&self.state, r.state.as_deref())
            && contains(&self.billing_period, r.billing_period.as_deref())
            && within(&self.from_date, &self.to_date, local_day(r.sent_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values_are_omitted() {
        let filter = CardFilter {
            sender: Some("  ".into()),
            customer_name: Some("An".into()),
            ..Default::default()
        };
        assert_eq!(filter.to_query(), vec![("ten_khach", "An".to_string())]);
        assert!(CardFilter::default().is_empty());
    }

    #[test]
    fn test_momo_dates_use_iso_format() {
        let filter = MomoFilter {
            from_date: NaiveDate::from_ymd_opt(2024, 7, 1),
            ..Default::default()
        };
        assert_eq!(filter.to_query(), vec![("from_date", "2024-07-01".to_string())]);
    }

    #[test]
    fn test_offset_search_matches_any_identity_field() {
        let record = OffsetInvoice {
            customer_code: Some("KH-77".into()),
            ..Default::default()
        };
        let filter = OffsetFilter {
            search: Some("kh-77".into()),
            ..Default::default()
        };
        assert!(filter.matches(&record));
    }
}
