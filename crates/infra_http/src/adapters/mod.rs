//! Port Adapters
//!
//! One adapter per domain port, all sharing a single [`ApiClient`] so the
//! session cookie and the 401 broadcast are common to every call.
//!
//! ```rust,ignore
//! let client = ApiClient::new(HttpConfig::new("http://localhost:8002"))?;
//! let cards: Arc<dyn InvoicePort<CardInvoice>> = Arc::new(HttpInvoiceAdapter::new(client.clone()));
//! let users: Arc<dyn AccessPort> = Arc::new(HttpAccessAdapter::new(client));
//! ```
//!
//! [`ApiClient`]: crate::ApiClient

pub mod invoice;
pub mod access;
pub mod report;

pub use invoice::{HttpInvoiceAdapter, InvoiceEndpoints};
pub use access::HttpAccessAdapter;
pub use report::HttpReportAdapter;
