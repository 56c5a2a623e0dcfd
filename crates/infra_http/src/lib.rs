//! Infrastructure HTTP Layer
//!
//! REST adapters for the invoice backend. Every domain port is implemented
//! here on top of one shared `reqwest` client with a cookie store.
//!
//! # Error Mapping
//!
//! | response                      | `PortError`            |
//! |-------------------------------|------------------------|
//! | 401                           | `Unauthorized` (and a `SessionEvent::LoginRequired` broadcast) |
//! | 403                           | `Forbidden`            |
//! | 404                           | `NotFound`             |
//! | 4xx, or 5xx with row issues   | `Unprocessable`        |
//! | other 5xx                     | `ServiceUnavailable`   |
//! | timeout                       | `Timeout`              |
//! | undecodable body              | `Transformation`       |
//! | transport failure             | `Connection`           |
//!
//! Error bodies go through one parser, [`error_body::parse_issues`].

pub mod client;
pub mod error;
pub mod error_body;
pub mod adapters;

pub use client::{ApiClient, Download, HttpConfig, SessionEvent};
pub use error::HttpError;
pub use error_body::parse_issues;
pub use adapters::{HttpAccessAdapter, HttpInvoiceAdapter, HttpReportAdapter, InvoiceEndpoints};
