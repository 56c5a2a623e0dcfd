//! Report Domain
//!
//! Period summaries with growth figures, commission by sender and the
//! calendar of invoices due for settlement.

pub mod period;
pub mod summary;
pub mod commission;
pub mod settlement;
pub mod ports;
pub mod error;

pub use period::{month_of, Granularity, RangePreset};
pub use summary::{growth, rollup, Growth, PeriodSum, SummaryReport, SummaryRow, SummaryTotals};
pub use commission::{top_by_commission, CommissionRow, TOP_SENDERS};
pub use settlement::{counts_by_date, group_by_due_date, DueCalendar, DueInvoice, UNKNOWN_SENDER};
pub use ports::ReportPort;
pub use error::ReportError;
