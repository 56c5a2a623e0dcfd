//! Batch Grouper
//!
//! A batch is the set of records sharing one `batch_id`; there is no batch
//! entity of its own. This module groups flat record lists, computes
//! per-batch aggregates, and exposes the first-record "representative" read
//! used for fields shown once per batch.

use core_kernel::money::lenient_vnd;
use core_kernel::{BatchId, Vnd};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::field::FieldValue;
use crate::record::InvoiceRecord;

/// All records sharing one batch id, in the order they were provided
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "R: InvoiceRecord")]
pub struct Batch<R> {
    pub batch_id: BatchId,
    pub records: Vec<R>,
}

impl<R: InvoiceRecord> Batch<R> {
    pub fn new(batch_id: BatchId, records: Vec<R>) -> Self {
        Self { batch_id, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn aggregate(&self) -> BatchAggregate {
        aggregate(&self.records)
    }

    pub fn representative_value(&self, field: R::Field) -> FieldValue {
        representative_value(&self.records, field)
    }
}

/// Groups a flat list by batch id, keeping batches in order of first appearance
/// and records in their original order within each batch.
pub fn group_by_batch<R: InvoiceRecord>(records: Vec<R>) -> Vec<Batch<R>> {
    let mut positions: HashMap<BatchId, usize> = HashMap::new();
    let mut batches: Vec<Batch<R>> = Vec::new();
    for record in records {
        let key = record.batch_id().clone();
        match positions.get(&key) {
            Some(&i) => batches[i].records.push(record),
            None => {
                positions.insert(key.clone(), batches.len());
                batches.push(Batch::new(key, vec![record]));
            }
        }
    }
    batches
}

/// Derived totals for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchAggregate {
    pub record_count: usize,
    pub total_amount: Vnd,
    pub total_fee: Vnd,
    pub customer_names: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub senders: BTreeSet<String>,
    pub has_new_customer: bool,
}

/// Sums amounts and fees and collects distinct identity values.
///
/// Unparseable amounts count as zero; the result does not depend on record order.
pub fn aggregate<R: InvoiceRecord>(records: &[R]) -> BatchAggregate {
    let mut agg = BatchAggregate {
        record_count: records.len(),
        ..Default::default()
    };
    for record in records {
        agg.total_amount = agg.total_amount + record.gross_amount().lenient();
        agg.total_fee = agg.total_fee + record.fee().lenient();
        collect_distinct(&mut agg.customer_names, record.customer_name());
        collect_distinct(&mut agg.phones, record.phone());
        collect_distinct(&mut agg.senders, record.sender());
        agg.has_new_customer |= record.is_new_customer();
    }
    agg
}

fn collect_distinct(set: &mut BTreeSet<String>, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
        set.insert(v.to_string());
    }
}

/// The first record's value for a field stored per row but shown once per batch.
///
/// Depends on record order. An empty batch yields [`FieldValue::Empty`].
pub fn representative_value<R: InvoiceRecord>(records: &[R], field: R::Field) -> FieldValue {
    records
        .first()
        .map(|r| r.get(field))
        .unwrap_or(FieldValue::Empty)
}

/// Totals shown at the top of a dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(rename = "totalRecords", alias = "total", default)]
    pub total_records: u64,
    #[serde(rename = "totalBatches", default)]
    pub total_batches: u64,
    #[serde(rename = "totalAmount", default, with = "lenient_vnd")]
    pub total_amount: Vnd,
    #[serde(rename = "totalFee", alias = "total_fee", default, with = "lenient_vnd")]
    pub total_fee: Vnd,
}

impl DashboardStats {
    /// Totals over the batches currently loaded
    pub fn from_batches<R: InvoiceRecord>(batches: &[Batch<R>]) -> Self {
        batches.iter().fold(Self::default(), |mut stats, batch| {
            let agg = batch.aggregate();
            stats.total_records += agg.record_count as u64;
            stats.total_batches += 1;
            stats.total_amount = stats.total_amount + agg.total_amount;
            stats.total_fee = stats.total_fee + agg.total_fee;
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::momo::{MomoField, MomoInvoice};
    use core_kernel::AmountText;

    fn row(batch: &str, amount: &str) -> MomoInvoice {
        MomoInvoice {
            batch_id: BatchId::new(batch),
            amount: AmountText::new(amount),
            ..Default::default()
        }
    }

    #[test]
    fn test_group_keeps_first_appearance_order() {
        let batches = group_by_batch(vec![row("B", "1"), row("A", "2"), row("B", "3")]);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].batch_id.as_str(), "B");
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[1].batch_id.as_str(), "A");
    }

    #[test]
    fn test_aggregate_treats_garbage_as_zero() {
        let agg = aggregate(&[row("B", "100"), row("B", "abc"), row("B", "")]);
        assert_eq!(agg.total_amount, Vnd::new(100));
        assert_eq!(agg.record_count, 3);
    }

    #[test]
    fn test_representative_value_reads_first_record() {
        let mut first = row("B", "1");
        first.transfer_out = AmountText::new("500");
        let second = row("B", "2");
        assert_eq!(
            representative_value(&[first.clone(), second.clone()], MomoField::TransferOut),
            FieldValue::amount("500")
        );
        assert_eq!(
            representative_value(&[second, first], MomoField::TransferOut),
            FieldValue::Empty
        );
        assert_eq!(
            representative_value::<MomoInvoice>(&[], MomoField::TransferOut),
            FieldValue::Empty
        );
    }

    #[test]
    fn test_stats_accept_each_backend_shape() {
        let card: DashboardStats = serde_json::from_str(
            r#"{"totalRecords": 3, "totalBatches": 2, "totalAmount": 300000, "totalFee": 30000}"#,
        )
        .unwrap();
        assert_eq!(card.total_batches, 2);
        let momo: DashboardStats =
            serde_json::from_str(r#"{"total": 5, "totalAmount": 1000.0, "total_fee": null}"#).unwrap();
        assert_eq!(momo.total_records, 5);
        assert_eq!(momo.total_amount, Vnd::new(1000));
        assert_eq!(momo.total_fee, Vnd::ZERO);
    }
}
