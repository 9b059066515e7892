//! Remote-schema reconciliation.
//!
//! The IO half of schema reconciliation: read the field names the remote
//! collection declares, diff them against the record via the engine's
//! planner, and issue one creation call per missing field. Each missing
//! field is a separate remote call; schema drift is rare after the first
//! few writes, so the steady state is zero calls.

use crate::api::RemoteApi;
use depot_engine::{missing_fields, Record};

/// Ensure every field the record carries (plus the implicit `timestamp`
/// column) exists in the remote collection.
///
/// Creation failures follow the crate-wide contract: logged by the API
/// wrapper and otherwise ignored, the subsequent write surfaces the
/// problem.
pub fn ensure_fields(api: &RemoteApi, record: &Record) {
    let remote_fields = api.list_field_names();
    for spec in missing_fields(&remote_fields, record) {
        tracing::debug!(field = %spec.name, kind = %spec.kind, "creating remote field");
        api.create_field(&spec.name, spec.kind);
    }
}
