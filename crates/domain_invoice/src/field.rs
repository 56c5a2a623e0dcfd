//! Field keys and field values
//!
//! Each record family has a field enum generated by [`record_fields!`].
//! Editors, projections and validation address fields through that enum and
//! exchange values as [`FieldValue`], never by string key.

use chrono::{DateTime, Utc};
use core_kernel::temporal::{format_timestamp, parse_operator_input};
use core_kernel::{AmountText, BatchId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// A typed key into one record family
pub trait FieldKey: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    /// Name used by the backend
    fn wire_name(&self) -> &'static str;

    /// Human label shown to operators
    fn label(&self) -> &'static str;

    fn all() -> &'static [Self];

    fn from_wire(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.wire_name() == name)
    }
}

/// Đáo (roll-over) or Rút (withdrawal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionType {
    Dao,
    Rut,
}

impl TransactionType {
    pub fn as_wire(&self) -> &'static str {
        match self {
            TransactionType::Dao => "DAO",
            TransactionType::Rut => "RUT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Dao => "Đáo",
            TransactionType::Rut => "Rút",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dao" | "đáo" => Ok(TransactionType::Dao),
            "rut" | "rút" => Ok(TransactionType::Rut),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for TransactionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

/// A status stored by the backend as the string `"true"` or `"false"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusFlag {
    True,
    False,
}

impl StatusFlag {
    pub fn is_set(&self) -> bool {
        matches!(self, StatusFlag::True)
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            StatusFlag::True => "true",
            StatusFlag::False => "false",
        }
    }
}

impl From<bool> for StatusFlag {
    fn from(value: bool) -> Self {
        if value {
            StatusFlag::True
        } else {
            StatusFlag::False
        }
    }
}

impl FromStr for StatusFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" => Ok(StatusFlag::True),
            "false" | "0" => Ok(StatusFlag::False),
            other => Err(format!("expected true or false, got {}", other)),
        }
    }
}

impl fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for StatusFlag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

/// The value held by one field of one record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Empty,
    Text(String),
    Amount(AmountText),
    TxType(TransactionType),
    Flag(StatusFlag),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Text value; blank text is [`FieldValue::Empty`]
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(value)
        }
    }

    /// Amount value; empty text is [`FieldValue::Empty`]
    pub fn amount(value: impl Into<AmountText>) -> Self {
        let value = value.into();
        if value.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Amount(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// True when the value is a non-negative whole number
    pub fn is_numeric(&self) -> bool {
        match self {
            FieldValue::Amount(a) => matches!(a.parse(), Ok(Some(_))),
            FieldValue::Text(t) => {
                let t = t.trim();
                !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit())
            }
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Empty => "empty",
            FieldValue::Text(_) => "text",
            FieldValue::Amount(_) => "amount",
            FieldValue::TxType(_) => "transaction type",
            FieldValue::Flag(_) => "status flag",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for FieldValue {
    /// The stored representation; no timezone shift is applied here
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Empty => Ok(()),
            FieldValue::Text(t) => f.write_str(t),
            FieldValue::Amount(a) => write!(f, "{}", a),
            FieldValue::TxType(t) => write!(f, "{}", t),
            FieldValue::Flag(s) => write!(f, "{}", s),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Timestamp(ts) => f.write_str(&format_timestamp(*ts)),
        }
    }
}

/// Storage for one field inside a record struct
pub trait FieldSlot {
    fn read(&self) -> FieldValue;

    /// Stores a typed value; on a kind mismatch returns the expected kind
    fn write(&mut self, value: FieldValue) -> Result<(), &'static str>;

    /// Stores raw operator input; on failure returns the reason
    fn write_input(&mut self, raw: &str) -> Result<(), String>;
}

impl FieldSlot for Option<String> {
    fn read(&self) -> FieldValue {
        self.as_deref().map(FieldValue::text).unwrap_or(FieldValue::Empty)
    }

    fn write(&mut self, value: FieldValue) -> Result<(), &'static str> {
        match value {
            FieldValue::Empty => *self = None,
            FieldValue::Text(t) => *self = Some(t).filter(|t| !t.trim().is_empty()),
            _ => return Err("text"),
        }
        Ok(())
    }

    fn write_input(&mut self, raw: &str) -> Result<(), String> {
        *self = Some(raw.to_string()).filter(|t| !t.trim().is_empty());
        Ok(())
    }
}

impl FieldSlot for AmountText {
    fn read(&self) -> FieldValue {
        FieldValue::amount(self.clone())
    }

    fn write(&mut self, value: FieldValue) -> Result<(), &'static str> {
        match value {
            FieldValue::Empty => *self = AmountText::empty(),
            FieldValue::Amount(a) => *self = a,
            FieldValue::Text(t) => *self = AmountText::new(t),
            _ => return Err("amount"),
        }
        Ok(())
    }

    fn write_input(&mut self, raw: &str) -> Result<(), String> {
        *self = AmountText::new(raw);
        Ok(())
    }
}

impl FieldSlot for BatchId {
    fn read(&self) -> FieldValue {
        FieldValue::text(self.as_str())
    }

    fn write(&mut self, value: FieldValue) -> Result<(), &'static str> {
        match value {
            FieldValue::Empty => *self = BatchId::default(),
            FieldValue::Text(t) => *self = BatchId::new(t),
            _ => return Err("text"),
        }
        Ok(())
    }

    fn write_input(&mut self, raw: &str) -> Result<(), String> {
        *self = BatchId::new(raw.trim());
        Ok(())
    }
}

impl FieldSlot for Option<DateTime<Utc>> {
    fn read(&self) -> FieldValue {
        self.map(FieldValue::Timestamp).unwrap_or(FieldValue::Empty)
    }

    fn write(&mut self, value: FieldValue) -> Result<(), &'static str> {
        match value {
            FieldValue::Empty => *self = None,
            FieldValue::Timestamp(ts) => *self = Some(ts),
            _ => return Err("timestamp"),
        }
        Ok(())
    }

    /// Operators type wall-clock time in the display timezone
    fn write_input(&mut self, raw: &str) -> Result<(), String> {
        if raw.trim().is_empty() {
            *self = None;
            return Ok(());
        }
        *self = Some(parse_operator_input(raw).map_err(|e| e.to_string())?);
        Ok(())
    }
}

impl FieldSlot for Option<TransactionType> {
    fn read(&self) -> FieldValue {
        self.map(FieldValue::TxType).unwrap_or(FieldValue::Empty)
    }

    fn write(&mut self, value: FieldValue) -> Result<(), &'static str> {
        match value {
            FieldValue::Empty => *self = None,
            FieldValue::TxType(t) => *self = Some(t),
            FieldValue::Text(t) => *self = Some(t.parse().map_err(|_| "transaction type")?),
            _ => return Err("transaction type"),
        }
        Ok(())
    }

    fn write_input(&mut self, raw: &str) -> Result<(), String> {
        *self = if raw.trim().is_empty() { None } else { Some(raw.parse()?) };
        Ok(())
    }
}

impl FieldSlot for Option<StatusFlag> {
    fn read(&self) -> FieldValue {
        self.map(FieldValue::Flag).unwrap_or(FieldValue::Empty)
    }

    fn write(&mut self, value: FieldValue) -> Result<(), &'static str> {
        match value {
            FieldValue::Empty => *self = None,
            FieldValue::Flag(s) => *self = Some(s),
            FieldValue::Bool(b) => *self = Some(StatusFlag::from(b)),
            _ => return Err("status flag"),
        }
        Ok(())
    }

    fn write_input(&mut self, raw: &str) -> Result<(), String> {
        *self = if raw.trim().is_empty() { None } else { Some(raw.parse()?) };
        Ok(())
    }
}

impl FieldSlot for bool {
    fn read(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }

    fn write(&mut self, value: FieldValue) -> Result<(), &'static str> {
        match value {
            FieldValue::Empty => *self = false,
            FieldValue::Bool(b) => *self = b,
            FieldValue::Flag(s) => *self = s.is_set(),
            _ => return Err("boolean"),
        }
        Ok(())
    }

    fn write_input(&mut self, raw: &str) -> Result<(), String> {
        *self = match raw.trim().to_lowercase().as_str() {
            "" | "false" | "0" | "không" => false,
            "true" | "1" | "có" => true,
            other => return Err(format!("expected yes or no, got {}", other)),
        };
        Ok(())
    }
}

/// Deserializers tolerant of the loosely typed JSON the backend emits
pub(crate) mod loose {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Bool(bool),
        Int(i64),
        Float(f64),
    }

    impl Scalar {
        fn into_string(self) -> String {
            match self {
                Scalar::Text(s) => s,
                Scalar::Bool(b) => b.to_string(),
                Scalar::Int(i) => i.to_string(),
                Scalar::Float(f) => f.to_string(),
            }
        }
    }

    /// Blank strings and `null` become `None`; scalars are parsed from their text
    pub fn option<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: fmt::Display,
    {
        match Option::<Scalar>::deserialize(deserializer)? {
            None => Ok(None),
            Some(scalar) => {
                let raw = scalar.into_string();
                if raw.trim().is_empty() {
                    Ok(None)
                } else {
                    raw.trim().parse().map(Some).map_err(serde::de::Error::custom)
                }
            }
        }
    }

    /// Accepts `true`/`false`, `1`/`0`, their string forms, and `null` as false
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(option::<D, StatusFlag>(deserializer)?
            .map(|f| f.is_set())
            .unwrap_or(false))
    }
}

/// Declares the field enum of a record family and wires it to the record's members.
///
/// Every member named here must implement [`FieldSlot`].
macro_rules! record_fields {
    (
        $(#[$meta:meta])*
        $record:ident => $field:ident {
            $($variant:ident => $member:ident, $wire:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $field {
            $($variant,)+
        }

        impl $field {
            pub const ALL: &'static [$field] = &[$($field::$variant),+];
        }

        impl $crate::field::FieldKey for $field {
            fn wire_name(&self) -> &'static str {
                match self {
                    $($field::$variant => $wire,)+
                }
            }

            fn label(&self) -> &'static str {
                match self {
                    $($field::$variant => $label,)+
                }
            }

            fn all() -> &'static [Self] {
                Self::ALL
            }
        }

        impl ::std::fmt::Display for $field {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::field::FieldKey::wire_name(self))
            }
        }

        impl $record {
            fn read_slot(&self, field: $field) -> $crate::field::FieldValue {
                use $crate::field::FieldSlot;
                match field {
                    $($field::$variant => self.$member.read(),)+
                }
            }

            fn write_slot(
                &mut self,
                field: $field,
                value: $crate::field::FieldValue,
            ) -> Result<(), $crate::error::InvoiceError> {
                use $crate::field::FieldSlot;
                let found = value.kind();
                match field {
                    $($field::$variant => self.$member.write(value).map_err(|expected| {
                        $crate::error::InvoiceError::FieldType { field: $wire, expected, found }
                    }),)+
                }
            }

            fn write_slot_input(
                &mut self,
                field: $field,
                raw: &str,
            ) -> Result<(), $crate::error::InvoiceError> {
                use $crate::field::FieldSlot;
                match field {
                    $($field::$variant => self.$member.write_input(raw).map_err(|reason| {
                        $crate::error::InvoiceError::InvalidInput { field: $wire, reason }
                    }),)+
                }
            }
        }
    };
}

pub(crate) use record_fields;
