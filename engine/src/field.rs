//! Typed field values.
//!
//! A [`Field`] pairs a name with a string-coerced value and a declared
//! semantic kind. Values are coerced to strings at construction time; the
//! wire format never receives native numeric or structured types, only
//! strings (a [`FieldKind::Json`] value is pre-serialized to JSON text).

use crate::{error::Result, Error, FieldName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic kinds a field value can declare.
///
/// Each kind maps 1:1 to a remote schema primitive type name, used only when
/// the schema reconciler has to create the field remotely. The canonical wire
/// casing is lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Timestamp,
    /// Arbitrary structured data, pre-serialized to JSON text
    Json,
}

impl FieldKind {
    /// The remote schema primitive type name for this kind.
    pub fn wire_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Json => "json",
        }
    }

    /// Parse a kind from its wire name.
    ///
    /// Parsing is case-insensitive (older producers used `'String'`-style
    /// casing) and accepts the legacy alias `real` for [`FieldKind::Float`],
    /// so the alias is translated before anything reaches the wire.
    pub fn from_wire_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Ok(FieldKind::String),
            "integer" => Ok(FieldKind::Integer),
            "float" | "real" => Ok(FieldKind::Float),
            "timestamp" => Ok(FieldKind::Timestamp),
            "json" => Ok(FieldKind::Json),
            other => Err(Error::UnknownFieldKind(other.to_string())),
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// An immutable named value with a declared kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    name: FieldName,
    value: String,
    kind: FieldKind,
}

impl Field {
    /// Create a field with an explicit kind. Coercion via `Display` never
    /// fails; use [`Field::json`] for structured values.
    pub fn new(name: impl Into<FieldName>, value: impl fmt::Display, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            value: value.to_string(),
            kind,
        }
    }

    /// A string-kind field.
    pub fn string(name: impl Into<FieldName>, value: impl fmt::Display) -> Self {
        Self::new(name, value, FieldKind::String)
    }

    /// An integer-kind field.
    pub fn integer(name: impl Into<FieldName>, value: i64) -> Self {
        Self::new(name, value, FieldKind::Integer)
    }

    /// A float-kind field.
    pub fn float(name: impl Into<FieldName>, value: f64) -> Self {
        Self::new(name, value, FieldKind::Float)
    }

    /// A timestamp-kind field. The value is stored verbatim; formatting is
    /// the caller's concern.
    pub fn timestamp(name: impl Into<FieldName>, value: impl fmt::Display) -> Self {
        Self::new(name, value, FieldKind::Timestamp)
    }

    /// A JSON-kind field. The value is serialized to JSON text immediately;
    /// a non-serializable value surfaces here, not at write time.
    pub fn json<T: Serialize>(name: impl Into<FieldName>, value: &T) -> Result<Self> {
        let name = name.into();
        let text = serde_json::to_string(value).map_err(|source| Error::JsonSerialization {
            name: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            value: text,
            kind: FieldKind::Json,
        })
    }

    /// The field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The string-coerced value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The declared kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}
