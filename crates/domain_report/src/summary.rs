//! Summary report
//!
//! One row per period bucket as returned by the backend, plus the totals and
//! growth figures the report screen shows above the chart.

use core_kernel::money::lenient_vnd;
use core_kernel::Vnd;
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single period bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Period label, e.g. `2024-03-15` or `2024-03-15 08:00`
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub total_invoices: u64,
    #[serde(default)]
    pub total_batches: u64,
    #[serde(default, with = "lenient_vnd")]
    pub total_amount: Vnd,
    #[serde(default, with = "lenient_vnd")]
    pub total_fee: Vnd,
    #[serde(default)]
    pub total_new_customers: u64,
}

/// Sums over every bucket in a summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryTotals {
    pub invoices: u64,
    pub batches: u64,
    pub amount: Vnd,
    pub fee: Vnd,
    pub new_customers: u64,
}

impl SummaryTotals {
    pub fn of(rows: &[SummaryRow]) -> Self {
        rows.iter().fold(Self::default(), |acc, row| Self {
            invoices: acc.invoices + row.total_invoices,
            batches: acc.batches + row.total_batches,
            amount: acc.amount + row.total_amount,
            fee: acc.fee + row.total_fee,
            new_customers: acc.new_customers + row.total_new_customers,
        })
    }
}

/// Amount and fee of one rolled-up period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodSum {
    pub amount: Vnd,
    pub fee: Vnd,
}

/// Percentage change from `previous` to `current`, one decimal place.
///
/// `None` when there is no previous value to compare against.
pub fn growth(current: Vnd, previous: Vnd) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    let current = Decimal::from(current.amount());
    let previous = Decimal::from(previous.amount());
    let percent = (current - previous).checked_div(previous)?.checked_mul(dec!(100))?;
    Some(percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// Rolls rows up by the first `prefix_len` characters of their period label
///
/// `7` groups `yyyy-mm-dd...` labels by month, `4` by year.
pub fn rollup(rows: &[SummaryRow], prefix_len: usize) -> BTreeMap<String, PeriodSum> {
    let mut sums: BTreeMap<String, PeriodSum> = BTreeMap::new();
    for row in rows {
        let key: String = row.period.chars().take(prefix_len).collect();
        let entry = sums.entry(key).or_default();
        entry.amount = entry.amount + row.total_amount;
        entry.fee = entry.fee + row.total_fee;
    }
    sums
}

/// Growth of amount and fee between the last two entries of a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Growth {
    pub amount: Option<Decimal>,
    pub fee: Option<Decimal>,
}

impl Growth {
    fn between_last_two(series: &[PeriodSum]) -> Self {
        match series {
            [.., previous, current] => Self {
                amount: growth(current.amount, previous.amount),
                fee: growth(current.fee, previous.fee),
            },
            _ => Self::default(),
        }
    }
}

/// Everything the summary screen shows for one fetch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryReport {
    pub rows: Vec<SummaryRow>,
    pub totals: SummaryTotals,
    pub by_bucket: Growth,
    pub by_month: Growth,
    pub by_year: Growth,
}

impl SummaryReport {
    /// Builds the report from rows in ascending period order
    pub fn from_rows(mut rows: Vec<SummaryRow>) -> Self {
        rows.sort_by(|a, b| a.period.cmp(&b.period));
        let buckets: Vec<PeriodSum> = rows
            .iter()
            .map(|r| PeriodSum { amount: r.total_amount, fee: r.total_fee })
            .collect();
        let months: Vec<PeriodSum> = rollup(&rows, 7).into_values().collect();
        let years: Vec<PeriodSum> = rollup(&rows, 4).into_values().collect();
        Self {
            totals: SummaryTotals::of(&rows),
            by_bucket: Growth::between_last_two(&buckets),
            by_month: Growth::between_last_two(&months),
            by_year: Growth::between_last_two(&years),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
