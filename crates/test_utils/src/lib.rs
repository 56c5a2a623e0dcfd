//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! invoice console test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built records, users and report rows
//! - `builders`: Builder patterns for invoice records and accounts
//! - `fake_backend`: An in-process axum server speaking the backend REST API
//! - `assertions`: Assertion helpers for save outcomes and server issues
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod fake_backend;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use fake_backend::*;
pub use assertions::*;
pub use generators::*;
