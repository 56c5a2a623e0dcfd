//! Invoice Domain
//!
//! Card, MoMo and offset invoice records and the batch workflow around them.
//!
//! # Batch Edit Lifecycle
//!
//! ```text
//! Idle -> Editing -> Validating -> Submitting -> Saved
//!            ^           |              |
//!            +-- Error <-+              +-> SubmitError -> Editing
//! ```

pub mod field;
pub mod record;
pub mod card;
pub mod momo;
pub mod offset;
pub mod batch;
pub mod projection;
pub mod fee;
pub mod validation;
pub mod editor;
pub mod reconcile;
pub mod filter;
pub mod display;
pub mod ports;
pub mod error;

pub use field::{FieldKey, FieldValue, StatusFlag, TransactionType};
pub use record::{Check, FieldRule, InvoiceFamily, InvoiceRecord, RuleScope, TransferOutPolicy};
pub use card::{CardField, CardInvoice};
pub use momo::{MomoField, MomoInvoice};
pub use offset::{OffsetField, OffsetInvoice};
pub use batch::{aggregate, group_by_batch, representative_value, Batch, BatchAggregate, DashboardStats};
pub use projection::{project_common, CommonFields};
pub use fee::{derive_fee, derive_fee_from_input, fill_missing_fees, refresh_fee, refresh_fee_from_input, transfer_out_total};
pub use validation::{validate_rows, RowError, ValidationReport, Violation};
pub use editor::{BatchEditSession, EditorState};
pub use reconcile::{BulkUpsertReconciler, BulkUpsertRequest, SaveOutcome};
pub use filter::{CardFilter, InvoiceFilter, MomoFilter, OffsetFilter};
pub use display::{mask_number, render_field, render_value};
pub use ports::{ExportFile, InvoicePort};
pub use error::InvoiceError;
