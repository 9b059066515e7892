//! Remote API wrapper.
//!
//! [`RemoteApi`] translates logical operations (read, create, update) into
//! HTTP calls against one named remote collection and normalizes the
//! outcome: every response is expected to carry a top-level `data` envelope,
//! and any transport error, non-2xx status, non-JSON body, or missing
//! envelope is treated uniformly as failure. Failures are logged and
//! surfaced as an absent result, never as an error - except that existence
//! checks suppress logging, since they are expected to fail routinely.

use crate::error::TransportError;
use crate::transport::{Transport, WireMethod, WireRequest, WireResponse};
use depot_engine::FieldKind;
use serde_json::{json, Value};
use std::sync::Arc;

/// Stateless-per-call wrapper around the remote collection API.
pub struct RemoteApi {
    host: String,
    token: String,
    collection: String,
    transport: Arc<dyn Transport>,
}

impl RemoteApi {
    /// Create a wrapper for one collection.
    ///
    /// `host` must have no trailing slash and `token` must already be
    /// resolved; [`crate::config::Config`] guarantees both.
    pub fn new(
        host: impl Into<String>,
        token: impl Into<String>,
        collection: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
            collection: collection.into(),
            transport,
        }
    }

    /// The collection this wrapper targets.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Read `endpoint` and extract the `data` envelope.
    ///
    /// Returns `None` on any failure; logs it unless `log_failures` is
    /// false.
    pub fn get(&self, endpoint: &str, log_failures: bool) -> Option<Value> {
        match self.request(WireMethod::Get, endpoint, None) {
            Ok(response) => match unwrap_data(&response) {
                Some(data) => Some(data),
                None => {
                    if log_failures {
                        tracing::error!(
                            endpoint,
                            status = response.status,
                            body = %response.body,
                            "request has failed"
                        );
                    }
                    None
                }
            },
            Err(err) => {
                if log_failures {
                    tracing::error!(endpoint, error = %err, "request has failed");
                }
                None
            }
        }
    }

    /// Create via `POST`. When `return_fields` is given, a `fields` query
    /// parameter asks the server to echo those fields back.
    pub fn post(&self, endpoint: &str, body: &Value, return_fields: Option<&[&str]>) -> Option<Value> {
        self.write(WireMethod::Post, endpoint, body, return_fields)
    }

    /// Update via `PATCH`. Same parameter and failure contract as
    /// [`RemoteApi::post`].
    pub fn patch(&self, endpoint: &str, body: &Value, return_fields: Option<&[&str]>) -> Option<Value> {
        self.write(WireMethod::Patch, endpoint, body, return_fields)
    }

    fn write(
        &self,
        method: WireMethod,
        endpoint: &str,
        body: &Value,
        return_fields: Option<&[&str]>,
    ) -> Option<Value> {
        let endpoint = match return_fields {
            Some(fields) if !fields.is_empty() => {
                format!("{}?fields={}", endpoint, fields.join(","))
            }
            _ => endpoint.to_string(),
        };

        match self.request(method, &endpoint, Some(body)) {
            Ok(response) => {
                tracing::debug!(%method, %endpoint, status = response.status, "write request completed");
                match unwrap_data(&response) {
                    Some(data) => Some(data),
                    None => {
                        tracing::error!(
                            %endpoint,
                            status = response.status,
                            payload = %body,
                            body = %response.body,
                            "request has failed"
                        );
                        None
                    }
                }
            }
            Err(err) => {
                tracing::error!(%method, %endpoint, error = %err, payload = %body, "request has failed");
                None
            }
        }
    }

    /// Whether the collection's schema descriptor is readable.
    ///
    /// Failure logging is suppressed: this check fails on every first write
    /// to a new collection and must not pollute logs.
    pub fn collection_exists(&self) -> bool {
        self.get(&format!("collections/{}", self.collection), false)
            .is_some()
    }

    /// Names of the fields the collection currently declares. Empty on any
    /// failure.
    pub fn list_field_names(&self) -> Vec<String> {
        let Some(data) = self.get(&format!("fields/{}", self.collection), true) else {
            return Vec::new();
        };

        data.as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("field").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ask the server to drop its response cache so reads reflect writes.
    ///
    /// Best effort: failure is logged at debug level and never escalated.
    pub fn clear_cache(&self) -> Option<Value> {
        match self.request(WireMethod::Post, "utils/cache/clear", None) {
            Ok(response) => {
                tracing::debug!(status = response.status, "cache cleared");
                unwrap_data(&response)
            }
            Err(err) => {
                tracing::debug!(error = %err, "cache clear failed");
                None
            }
        }
    }

    /// Create the collection shell with an empty schema. Idempotency is the
    /// server's responsibility.
    pub fn create_collection(&self) -> Option<Value> {
        let body = json!({
            "collection": self.collection,
            "schema": {},
            "meta": { "icon": "timeline" },
        });
        self.post("collections", &body, None)
    }

    /// Create one field with the schema type derived from `kind`.
    ///
    /// The legacy `real` kind name is already folded into
    /// [`FieldKind::Float`] at parse time, so the wire only ever sees
    /// `float`.
    pub fn create_field(&self, name: &str, kind: FieldKind) -> Option<Value> {
        let body = json!({
            "field": name,
            "type": kind.wire_name(),
            "schema": {},
            "meta": { "icon": "data_usage" },
        });
        self.post(&format!("fields/{}", self.collection), &body, None)
    }

    fn request(
        &self,
        method: WireMethod,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<WireResponse, TransportError> {
        let request = WireRequest {
            method,
            url: format!("{}/{}", self.host, endpoint),
            bearer: self.token.clone(),
            body: body.map(Value::to_string),
        };
        self.transport.send(&request)
    }
}

/// Extract the `data` envelope from a raw response.
///
/// `None` for non-2xx statuses, non-JSON bodies, and absent or null `data`.
fn unwrap_data(response: &WireResponse) -> Option<Value> {
    if !response.is_success() {
        return None;
    }
    let parsed: Value = serde_json::from_str(&response.body).ok()?;
    parsed.get("data").filter(|v| !v.is_null()).cloned()
}
