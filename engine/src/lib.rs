//! # Depot Engine
//!
//! The deterministic core of the depot storage driver.
//!
//! This crate models typed measurement fields, records, and the pure parts
//! of remote-schema reconciliation for a schema-on-write data store. It is
//! the logic half of the workspace; the `depot-driver` crate supplies
//! configuration, HTTP transport, and orchestration.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine has no knowledge of files, network, or platform
//! - **Deterministic**: same inputs always produce same outputs
//! - **Testable**: pure logic, no mocks needed
//!
//! ## Core Concepts
//!
//! ### Fields and Records
//!
//! A [`Field`] pairs a name with a string-coerced value and a [`FieldKind`].
//! Values are coerced at construction and the wire only ever carries
//! strings; JSON-kind values are pre-serialized to JSON text. A [`Record`]
//! is an ordered set of uniquely named fields representing one row.
//!
//! ### Schema planning
//!
//! [`missing_fields`] diffs a record against the field names a remote
//! collection declares and returns the ordered creation plan, including the
//! implicit `timestamp` column.
//!
//! ### Names and tokens
//!
//! [`normalize_collection_name`] maps raw collection names onto the remote
//! identifier alphabet, idempotently. [`resolve_token`] expands
//! `{{ ENV_VAR }}` placeholders in configured API tokens.
//!
//! ## Quick Start
//!
//! ```rust
//! use depot_engine::{missing_fields, Field, FieldKind, FieldSpec, Record};
//!
//! let record = Record::from_fields(vec![
//!     Field::float("cpu", 87.5),
//!     Field::integer("procs", 120),
//! ]).unwrap();
//!
//! let remote = vec!["id".to_string(), "timestamp".to_string(), "cpu".to_string()];
//! let plan = missing_fields(&remote, &record);
//! assert_eq!(plan, vec![FieldSpec::new("procs", FieldKind::Integer)]);
//! ```

pub mod error;
pub mod field;
pub mod name;
pub mod plan;
pub mod record;
pub mod token;

// Re-export main types at crate root
pub use error::Error;
pub use field::{Field, FieldKind};
pub use name::normalize_collection_name;
pub use plan::{missing_fields, FieldSpec, TIMESTAMP_FIELD};
pub use record::Record;
pub use token::{resolve_token, resolve_token_from_env};

/// Type aliases for clarity
pub type FieldName = String;
pub type CollectionName = String;
pub type RowId = u64;
