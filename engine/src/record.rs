//! Records - ordered field collections representing one row.

use crate::{error::Result, Error, Field};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered collection of fields with unique names, representing one row
/// to be stored remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Build a record from a list of fields, rejecting duplicate names.
    pub fn from_fields(fields: Vec<Field>) -> Result<Self> {
        let mut record = Self::new();
        for field in fields {
            record.push(field)?;
        }
        Ok(record)
    }

    /// Append a field. Field names must be unique within a record.
    pub fn push(&mut self, field: Field) -> Result<()> {
        if self.fields.iter().any(|f| f.name() == field.name()) {
            return Err(Error::DuplicateField(field.name().to_string()));
        }
        self.fields.push(field);
        Ok(())
    }

    /// Iterate the fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten to the wire row: a JSON object mapping each field name to its
    /// string value verbatim. No identifier or timestamp is injected here.
    /// Key order in the resulting object is `serde_json`'s map order, not
    /// insertion order; the remote store keys rows by name.
    pub fn flatten(&self) -> Map<String, Value> {
        let mut row = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            row.insert(
                field.name().to_string(),
                Value::String(field.value().to_string()),
            );
        }
        row
    }
}
