//! Commission by sender

use core_kernel::money::lenient_vnd;
use core_kernel::{Rate, Vnd};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// How many senders the commission chart shows
pub const TOP_SENDERS: usize = 10;

/// Card and MoMo totals for one sender
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRow {
    #[serde(rename = "nguoi_gui", default)]
    pub sender: String,
    #[serde(default)]
    pub total_transactions: u64,
    #[serde(default, with = "lenient_vnd")]
    pub total_amount: Vnd,
    #[serde(default, with = "lenient_vnd")]
    pub total_fee: Vnd,
    #[serde(default, with = "lenient_vnd")]
    pub total_commission: Vnd,
    #[serde(default)]
    pub total_transactions_momo: u64,
    #[serde(default, with = "lenient_vnd")]
    pub total_amount_momo: Vnd,
    #[serde(default, with = "lenient_vnd")]
    pub total_fee_momo: Vnd,
    #[serde(default, with = "lenient_vnd")]
    pub total_commission_momo: Vnd,
}

impl CommissionRow {
    /// The payout shown in the last column, rounded down to a whole dong
    pub fn final_commission(&self) -> Result<Vnd, ReportError> {
        Ok(Rate::sender_commission().apply_floor(self.total_amount)?)
    }
}

/// The `limit` senders with the highest commission, highest first
///
/// Ties keep the backend's order.
pub fn top_by_commission(rows: &[CommissionRow], limit: usize) -> Vec<CommissionRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|a, b| b.total_commission.cmp(&a.total_commission));
    sorted.truncate(limit);
    sorted
}
