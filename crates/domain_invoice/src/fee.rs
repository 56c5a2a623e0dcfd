//! Fee Deriver
//!
//! The service fee is a flat `floor(amount * 10%)`. It is computed on the
//! client so the operator sees it before saving; the backend stays the source
//! of truth for what is stored.

use core_kernel::{AmountText, MoneyError, Rate, Vnd};

use crate::error::InvoiceError;
use crate::field::FieldValue;
use crate::record::InvoiceRecord;

/// Fee for a stored gross amount.
///
/// The amount is read whole (`100000.00` counts as 100000). An empty or
/// unreadable amount gives an empty fee, not zero.
pub fn derive_fee(amount: &AmountText) -> Result<AmountText, MoneyError> {
    match amount.whole() {
        None => Ok(AmountText::empty()),
        Some(value) => Ok(Rate::service_fee().apply_floor(value)?.into()),
    }
}

/// Fee for a gross amount as the operator typed it; grouping dots, spaces
/// and currency signs are dropped first.
pub fn derive_fee_from_input(raw: &str) -> Result<AmountText, MoneyError> {
    derive_fee(&AmountText::new(raw).digits_only())
}

fn write_fee<R: InvoiceRecord>(record: &mut R, fee: AmountText) -> Result<(), InvoiceError> {
    record.set(R::fee_field(), FieldValue::amount(fee))
}

/// Recomputes the row's fee from its gross amount, for families whose fee is derived
pub fn refresh_fee<R: InvoiceRecord>(record: &mut R) -> Result<(), InvoiceError> {
    if !R::derives_fee() {
        return Ok(());
    }
    let fee = derive_fee(record.gross_amount())?;
    write_fee(record, fee)
}

/// Recomputes the row's fee from a gross amount the operator just typed
pub fn refresh_fee_from_input<R: InvoiceRecord>(record: &mut R, raw: &str) -> Result<(), InvoiceError> {
    if !R::derives_fee() {
        return Ok(());
    }
    write_fee(record, derive_fee_from_input(raw)?)
}

/// Fills in fees that were never derived (e.g. `null` from the backend)
pub fn fill_missing_fees<R: InvoiceRecord>(records: &mut [R]) -> Result<(), InvoiceError> {
    if !R::derives_fee() {
        return Ok(());
    }
    for record in records.iter_mut().filter(|r| r.fee().is_empty()) {
        refresh_fee(record)?;
    }
    Ok(())
}

/// Batch transfer-out: total gross minus total fee, unparseable values counting as zero.
///
/// Fees larger than the amounts are an error rather than a negative total.
pub fn transfer_out_total<R: InvoiceRecord>(records: &[R]) -> Result<Vnd, InvoiceError> {
    let amounts: Vnd = records.iter().map(|r| r.gross_amount().lenient()).sum();
    let fees: Vnd = records.iter().map(|r| r.fee().lenient()).sum();
    if fees > amounts {
        return Err(InvoiceError::NegativeTransferOut { amounts, fees });
    }
    Ok(amounts - fees)
}
