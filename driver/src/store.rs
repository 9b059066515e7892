//! The storage driver.
//!
//! [`StorageDriver`] orchestrates identifier assignment, schema
//! reconciliation, and single/batch writes against one remote collection.
//! It holds no mutable state across calls; every operation is a sequence of
//! blocking HTTP round-trips.

use crate::api::RemoteApi;
use crate::config::Config;
use crate::reconcile::ensure_fields;
use crate::transport::{HttpTransport, Transport};
use depot_engine::{Record, RowId, TIMESTAMP_FIELD};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default result limit for [`MetricStore::get_items`].
pub const DEFAULT_ITEM_LIMIT: usize = 1000;

/// Capability interface for metric storage backends.
///
/// All operations follow the crate-wide failure contract: problems are
/// logged and surfaced as an absent result, never as an error or panic.
pub trait MetricStore {
    /// Store one record as a new row.
    fn add(&self, record: &Record) -> Option<Value>;

    /// Store a batch of records in one write.
    fn add_many(&self, records: &[Record], return_fields: Option<&[&str]>) -> Option<Value>;

    /// Update a batch of records in one write.
    fn update_many(&self, records: &[Record], return_fields: Option<&[&str]>) -> Option<Value>;

    /// Total row count of the collection.
    fn get_items_count(&self) -> Option<u64>;

    /// Read rows matching equality filters, up to `limit`, optionally
    /// selecting specific fields.
    fn get_items(
        &self,
        filters: &BTreeMap<String, String>,
        limit: usize,
        fields: Option<&[&str]>,
    ) -> Option<Vec<Value>>;
}

/// When write timestamps are captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    /// Fresh timestamp per write (default)
    #[default]
    PerWrite,
    /// One timestamp captured at driver construction, reused for every
    /// write through this instance. Matches the historical behavior for
    /// byte-compatible rows.
    AtConstruction,
}

/// Storage driver for one remote collection.
pub struct StorageDriver {
    api: RemoteApi,
    mode: TimestampMode,
    construction_timestamp: String,
}

impl StorageDriver {
    /// Open a driver over an explicit transport.
    pub fn open(config: Config, transport: Arc<dyn Transport>) -> Self {
        let api = RemoteApi::new(config.host, config.token, config.collection, transport);
        Self {
            api,
            mode: TimestampMode::default(),
            construction_timestamp: now_timestamp(),
        }
    }

    /// Open a driver over the production HTTP transport.
    pub fn connect(config: Config) -> Result<Self, crate::error::TransportError> {
        Ok(Self::open(config, Arc::new(HttpTransport::new()?)))
    }

    /// Open a driver from the environment, terminating the process on any
    /// configuration problem.
    ///
    /// A driver cannot function without a collection, host, and token, so a
    /// bad configuration is fatal and non-recoverable: the error is logged
    /// and the process exits with code 1.
    pub fn open_or_exit() -> Self {
        let config = match Config::from_env() {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(error = %err, "invalid storage driver configuration");
                std::process::exit(1);
            }
        };
        match Self::connect(config) {
            Ok(driver) => driver,
            Err(err) => {
                tracing::error!(error = %err, "could not build http transport");
                std::process::exit(1);
            }
        }
    }

    /// Select when write timestamps are captured.
    pub fn with_timestamp_mode(mut self, mode: TimestampMode) -> Self {
        self.mode = mode;
        self
    }

    /// The normalized collection name this driver writes to.
    pub fn collection(&self) -> &str {
        self.api.collection()
    }

    fn write_timestamp(&self) -> String {
        match self.mode {
            TimestampMode::PerWrite => now_timestamp(),
            TimestampMode::AtConstruction => self.construction_timestamp.clone(),
        }
    }

    /// Compute the next row identifier as `max(existing ids) + 1`,
    /// defaulting to 1 when the collection is empty or unreadable.
    ///
    /// Known limitation: this read-then-write sequence is not atomic.
    /// Concurrent drivers targeting the same collection can compute the
    /// same identifier and silently overwrite each other; see the
    /// collision test in `tests/driver_test.rs`. For that reason writes
    /// are never retried.
    fn next_row_id(&self) -> RowId {
        let endpoint = format!("items/{}?sort=-id", self.api.collection());
        self.api
            .get(&endpoint, false)
            .as_ref()
            .and_then(Value::as_array)
            .and_then(|rows| {
                rows.iter()
                    .filter_map(|row| row.get("id").and_then(Value::as_u64))
                    .max()
            })
            .map(|max| max + 1)
            .unwrap_or(1)
    }

    fn items_endpoint(&self) -> String {
        format!("items/{}", self.api.collection())
    }

    fn flatten_batch(records: &[Record]) -> Value {
        Value::Array(
            records
                .iter()
                .map(|record| Value::Object(record.flatten()))
                .collect(),
        )
    }
}

impl MetricStore for StorageDriver {
    fn add(&self, record: &Record) -> Option<Value> {
        self.api.clear_cache();

        let row_id = self.next_row_id();
        if !self.api.collection_exists() {
            self.api.create_collection();
        }
        ensure_fields(&self.api, record);

        let mut row = Map::new();
        row.insert("id".to_string(), json!(row_id));
        row.insert(
            TIMESTAMP_FIELD.to_string(),
            Value::String(self.write_timestamp()),
        );
        for (name, value) in record.flatten() {
            row.insert(name, value);
        }

        let response = self
            .api
            .post(&self.items_endpoint(), &Value::Object(row), None);
        self.api.clear_cache();
        response
    }

    fn add_many(&self, records: &[Record], return_fields: Option<&[&str]>) -> Option<Value> {
        // Batch rows carry no id or timestamp; identifier assignment for
        // batches is delegated to the server.
        self.api.clear_cache();
        let response = self
            .api
            .post(&self.items_endpoint(), &Self::flatten_batch(records), return_fields);
        self.api.clear_cache();
        response
    }

    fn update_many(&self, records: &[Record], return_fields: Option<&[&str]>) -> Option<Value> {
        self.api.clear_cache();
        let response = self
            .api
            .patch(&self.items_endpoint(), &Self::flatten_batch(records), return_fields);
        self.api.clear_cache();
        response
    }

    fn get_items_count(&self) -> Option<u64> {
        let endpoint = format!("items/{}?aggregate[count]=*", self.api.collection());
        let data = self.api.get(&endpoint, true)?;
        let count = data.as_array()?.first()?.get("count")?;
        match count {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    fn get_items(
        &self,
        filters: &BTreeMap<String, String>,
        limit: usize,
        fields: Option<&[&str]>,
    ) -> Option<Vec<Value>> {
        let mut endpoint = format!("items/{}?limit={}", self.api.collection(), limit);
        for (key, value) in filters {
            endpoint.push_str(&format!("&filter[{key}][_eq]={value}"));
        }
        if let Some(fields) = fields {
            if !fields.is_empty() {
                endpoint.push_str(&format!("&fields={}", fields.join(",")));
            }
        }

        self.api.get(&endpoint, true)?.as_array().cloned()
    }
}

fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}
