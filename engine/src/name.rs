//! Collection-name normalization.
//!
//! Remote collection identifiers are restricted to `[a-z0-9]` runs joined by
//! underscores. Normalization must be deterministic and idempotent: the same
//! input always maps to the same remote collection.

/// Normalize a raw collection name.
///
/// Lowercases the input and collapses every run of characters outside
/// `[a-z0-9]` into a single `_`. Idempotent: normalizing an already
/// normalized name returns it unchanged.
///
/// ```
/// use depot_engine::normalize_collection_name;
///
/// assert_eq!(normalize_collection_name("Calc Materials!"), "calc_materials_");
/// assert_eq!(normalize_collection_name("calc_materials_"), "calc_materials_");
/// ```
pub fn normalize_collection_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;
    for ch in raw.to_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}
