//! The record model shared by the three invoice families
//!
//! A record is a flat, field-keyed entity tagged with a batch id. Each family
//! is a concrete struct implementing [`InvoiceRecord`]; the trait also carries
//! the family's batch policy (shared fields, validation rules, fee and
//! transfer-out handling) so the batch machinery stays generic.

use chrono::{DateTime, Utc};
use core_kernel::{AmountText, BatchId, RecordId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvoiceError;
use crate::field::{FieldKey, FieldValue};
use crate::filter::InvoiceFilter;

/// The three record families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceFamily {
    Card,
    Momo,
    Offset,
}

impl InvoiceFamily {
    pub fn label(&self) -> &'static str {
        match self {
            InvoiceFamily::Card => "Hóa đơn",
            InvoiceFamily::Momo => "Hóa đơn MoMo",
            InvoiceFamily::Offset => "Đối ứng",
        }
    }

    /// Filename of the spreadsheet export
    pub fn export_filename(&self) -> &'static str {
        match self {
            InvoiceFamily::Card => "hoa-don.xlsx",
            InvoiceFamily::Momo => "momo-hoa-don.xlsx",
            InvoiceFamily::Offset => "doi-ung.xlsx",
        }
    }

    /// Whether the backend list endpoint returns `{batch_id, records}` groups
    pub fn is_grouped_by_backend(&self) -> bool {
        !matches!(self, InvoiceFamily::Offset)
    }
}

impl fmt::Display for InvoiceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a batch's transfer-out amount is settled on save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutPolicy {
    /// Recomputed as `sum(gross) - sum(fee)` and written to every row
    Recompute,
    /// Whatever the common field holds is merged like any other shared field
    FromCommonField,
    /// The family has no transfer-out field
    NotApplicable,
}

/// What a rule checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// The field must not be empty
    Required,
    /// If present, the field must be a non-negative whole number
    Numeric,
    /// Both of the above
    RequiredNumeric,
}

/// Which rows a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    AllRows,
    /// Rows with the `-1` sentinel id
    NewRows,
    /// Rows where the field was edited in this session, through the common
    /// form or on the row itself
    WhenEdited,
}

/// One local validation rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule<F> {
    pub field: F,
    pub check: Check,
    pub scope: RuleScope,
}

impl<F> FieldRule<F> {
    pub const fn new(field: F, check: Check, scope: RuleScope) -> Self {
        Self { field, check, scope }
    }
}

/// A record of one invoice family
pub trait InvoiceRecord:
    Clone + fmt::Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    type Field: FieldKey;
    type Filter: InvoiceFilter<Self>;

    const FAMILY: InvoiceFamily;

    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);
    fn batch_id(&self) -> &BatchId;
    fn set_batch_id(&mut self, batch_id: BatchId);

    fn get(&self, field: Self::Field) -> FieldValue;
    fn set(&mut self, field: Self::Field, value: FieldValue) -> Result<(), InvoiceError>;

    /// Writes raw operator input, converting it to the field's type
    fn set_input(&mut self, field: Self::Field, raw: &str) -> Result<(), InvoiceError>;

    fn gross_amount(&self) -> &AmountText;
    fn fee(&self) -> &AmountText;
    fn customer_name(&self) -> Option<&str>;
    fn phone(&self) -> Option<&str>;
    fn sender(&self) -> Option<&str>;
    fn transaction_time(&self) -> Option<DateTime<Utc>>;

    fn is_new_customer(&self) -> bool {
        false
    }

    fn gross_field() -> Self::Field;
    fn fee_field() -> Self::Field;

    /// Whether the fee follows the gross amount at the flat service rate
    fn derives_fee() -> bool;

    fn transfer_out_field() -> Option<Self::Field>;
    fn transfer_out_policy() -> TransferOutPolicy;

    /// Fields edited once for the whole batch
    fn shared_fields() -> &'static [Self::Field];

    fn row_rules() -> &'static [FieldRule<Self::Field>];

    /// Card and account numbers, masked in read-only views
    fn masked_fields() -> &'static [Self::Field];

    /// A blank record with the `-1` sentinel id
    fn blank() -> Self {
        Self::default()
    }

    fn is_new(&self) -> bool {
        self.id().is_new()
    }
}
