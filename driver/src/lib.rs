//! # Depot Driver
//!
//! Remote-schema-reconciling storage driver: takes locally computed
//! measurement records (built with `depot-engine`) and persists them to a
//! hosted schema-on-write data store over HTTP, lazily creating the remote
//! collection and any missing fields on the way.
//!
//! ## Call model
//!
//! Single-threaded, synchronous, blocking. Every operation issues one or
//! more sequential HTTP round-trips through the [`Transport`] seam; there
//! is no internal concurrency and no retry anywhere. Transport and response
//! failures are logged through `tracing` and surfaced as absent results;
//! the only fatal path is configuration bootstrap.
//!
//! ## Quick Start
//!
//! ```no_run
//! use depot_driver::{Config, MetricStore, StorageDriver};
//! use depot_engine::{Field, Record};
//!
//! let config = Config::new("Temp Log", "https://data.example.com", "{{API_TOKEN}}").unwrap();
//! let driver = StorageDriver::connect(config).unwrap();
//!
//! let record = Record::from_fields(vec![Field::float("cpu", 87.5)]).unwrap();
//! driver.add(&record);
//! ```
//!
//! ## Known limitation
//!
//! Row identifiers for single writes are assigned client-side as
//! `max(existing ids) + 1`. The read-then-write sequence is not atomic:
//! concurrent drivers on the same collection can assign the same id. See
//! `StorageDriver` for details; batch writes avoid this by delegating
//! identifier assignment to the server.

pub mod api;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod store;
pub mod transport;

// Re-export main types at crate root
pub use api::RemoteApi;
pub use config::{Config, ConfigError};
pub use error::TransportError;
pub use reconcile::ensure_fields;
pub use store::{MetricStore, StorageDriver, TimestampMode, DEFAULT_ITEM_LIMIT};
pub use transport::{HttpTransport, Transport, WireMethod, WireRequest, WireResponse, DEFAULT_TIMEOUT};
