//! Core Kernel - Foundational types for the invoice console
//!
//! This crate provides the building blocks used across the domain crates:
//! - VND amounts, raw amount text and the percentage rate
//! - The display timezone and wire timestamp handling
//! - Record, batch and user identifiers
//! - Pagination and the port error contract

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod pagination;
pub mod ports;
pub mod error;

pub use money::{AmountText, MoneyError, Rate, Vnd};
pub use temporal::{
    format_for_display, from_display_timezone, to_display_timezone, DateRange, TemporalError,
    Timezone,
};
pub use identifiers::{BatchId, EditTicket, PermissionId, RecordId, UserId, NEW_RECORD_SENTINEL};
pub use pagination::{Page, PageRequest};
pub use ports::{DomainPort, PortError, ServerIssue};
pub use error::CoreError;
