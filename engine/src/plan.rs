//! Schema-delta planning.
//!
//! Given the field names a remote collection already declares and a record
//! about to be written, produce the ordered list of fields that must be
//! created remotely first. This is the pure half of schema reconciliation;
//! the driver turns each entry into one field-creation call. After the first
//! few writes the plan is expected to be empty.

use crate::{FieldKind, FieldName, Record};
use serde::{Deserialize, Serialize};

/// The implicit column every stored row carries, never supplied by callers.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// A field the remote collection is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Field name to create
    pub name: FieldName,
    /// Declared kind for the new field
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(name: impl Into<FieldName>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Compute the fields that must be created before `record` can be stored.
///
/// The implicit `timestamp` column comes first if absent, followed by one
/// entry per record field whose name is not in `remote_fields`, in record
/// order. Linear in record size; no deduplication beyond the record's own
/// name uniqueness.
pub fn missing_fields(remote_fields: &[String], record: &Record) -> Vec<FieldSpec> {
    let mut plan = Vec::new();

    if !remote_fields.iter().any(|f| f == TIMESTAMP_FIELD) {
        plan.push(FieldSpec::new(TIMESTAMP_FIELD, FieldKind::Timestamp));
    }

    for field in record.fields() {
        if !remote_fields.iter().any(|f| f == field.name()) {
            plan.push(FieldSpec::new(field.name(), field.kind()));
        }
    }

    plan
}
