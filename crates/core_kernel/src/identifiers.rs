//! Strongly-typed identifiers
//!
//! Record ids come from the backend as integers, with `-1` reserved for a row
//! that exists only on the client. [`RecordId`] makes that sentinel a variant
//! so it cannot be mistaken for a persisted id.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use crate::error::CoreError;

/// Wire value marking a record that has not been persisted yet
pub const NEW_RECORD_SENTINEL: i64 = -1;

macro_rules! define_numeric_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

define_numeric_id!(UserId, "USR");
define_numeric_id!(PermissionId, "PRM");

/// Identity of an invoice record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordId {
    /// Client-side placeholder, `-1` on the wire
    #[default]
    New,
    Persisted(i64),
}

impl RecordId {
    pub fn from_wire(value: i64) -> Self {
        if value == NEW_RECORD_SENTINEL {
            RecordId::New
        } else {
            RecordId::Persisted(value)
        }
    }

    pub fn to_wire(&self) -> i64 {
        match self {
            RecordId::New => NEW_RECORD_SENTINEL,
            RecordId::Persisted(id) => *id,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, RecordId::New)
    }

    pub fn persisted(&self) -> Option<i64> {
        match self {
            RecordId::New => None,
            RecordId::Persisted(id) => Some(*id),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::New => f.write_str("new"),
            RecordId::Persisted(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self::from_wire(value)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.to_wire())
    }
}

struct RecordIdVisitor;

impl<'de> Visitor<'de> for RecordIdVisitor {
    type Value = RecordId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer record id")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
        Ok(RecordId::from_wire(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
        i64::try_from(v)
            .map(RecordId::from_wire)
            .map_err(|_| E::custom(format!("record id out of range: {}", v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
        v.trim()
            .parse::<i64>()
            .map(RecordId::from_wire)
            .map_err(|_| E::custom(format!("invalid record id: {}", v)))
    }

    fn visit_none<E: de::Error>(self) -> Result<RecordId, E> {
        Ok(RecordId::New)
    }

    fn visit_unit<E: de::Error>(self) -> Result<RecordId, E> {
        Ok(RecordId::New)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<RecordId, D::Error> {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RecordIdVisitor)
    }
}

/// Key shared by every record created in one ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(String);

impl BatchId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// A batch id typed by an operator; surrounding blanks are dropped
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::InvalidBatchId(value.to_string()));
        }
        Ok(Self::new(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BatchId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BatchId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Identifies one opening of a batch editor
///
/// Responses tagged with a ticket other than the live one are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditTicket(Uuid);

impl EditTicket {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EditTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EditTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EDT-{}", self.0)
    }
}
