//! Property-Based Test Generators
//!
//! Proptest strategies for amounts as operators type them, records and
//! batches.

use core_kernel::{AmountText, BatchId, RecordId};
use domain_invoice::{Batch, MomoInvoice};
use proptest::prelude::*;

use crate::builders::MomoInvoiceBuilder;

/// Whole-dong amounts up to ten billion
pub fn amount_strategy() -> impl Strategy<Value = i64> {
    0i64..10_000_000_000i64
}

/// Renders an amount the way operators type it: plain, dotted or comma-grouped
pub fn typed_amount(amount: i64, style: u8) -> String {
    let plain = amount.to_string();
    let separator = match style % 3 {
        0 => return plain,
        1 => '.',
        _ => ',',
    };
    let digits: Vec<char> = plain.chars().collect();
    let mut out = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(*c);
    }
    out
}

/// An amount paired with its typed text
pub fn typed_amount_strategy() -> impl Strategy<Value = (i64, String)> {
    (amount_strategy(), any::<u8>()).prop_map(|(amount, style)| (amount, typed_amount(amount, style)))
}

/// Text that never parses as an amount
pub fn garbage_amount_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,8}"
}

pub fn batch_id_strategy() -> impl Strategy<Value = BatchId> {
    "[A-Z]{2}-[0-9]{4}".prop_map(BatchId::new)
}

/// A persisted MoMo row with a random amount
pub fn momo_record_strategy() -> impl Strategy<Value = MomoInvoice> {
    (1i64..100_000, amount_strategy()).prop_map(|(id, amount)| {
        let mut record = MomoInvoiceBuilder::new().with_id(id).build();
        record.amount = AmountText::new(amount.to_string());
        record
    })
}

/// A MoMo batch of 1..=`max_rows` persisted rows with distinct ids
pub fn momo_batch_strategy(max_rows: usize) -> impl Strategy<Value = Batch<MomoInvoice>> {
    (batch_id_strategy(), prop::collection::vec(amount_strategy(), 1..=max_rows)).prop_map(|(batch_id, amounts)| {
        let records = amounts
            .into_iter()
            .enumerate()
            .map(|(i, amount)| {
                let mut record = MomoInvoiceBuilder::new().in_batch(batch_id.as_str()).build();
                record.id = RecordId::Persisted(i as i64 + 1);
                record.amount = AmountText::new(amount.to_string());
                record
            })
            .collect();
        Batch::new(batch_id, records)
    })
}
