//! Deterministic cache keys for NDVI queries and observations.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Prefix for single-observation keys.
pub const OBSERVATION_KEY_PREFIX: &str = "ndvi:obs";

/// Extra query parameters folded into a window key.
pub type KeyExtras = BTreeMap<String, Value>;

/// SHA-256 digest (64 lowercase hex chars) of a window query.
///
/// Inputs are serialized as JSON with every object's keys sorted, so the
/// order in which `extra` was built never changes the key. `None` and an
/// empty map produce the same key.
pub fn make_cache_key(
    field_id: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    source: &str,
    extra: Option<&KeyExtras>,
) -> String {
    let extra = extra
        .map(|map| Value::Object(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()))
        .unwrap_or_else(|| Value::Object(Map::new()));

    let mut payload = Map::new();
    payload.insert("end_date".to_string(), Value::String(end_date.to_string()));
    payload.insert("extra".to_string(), extra);
    payload.insert("field_id".to_string(), Value::String(field_id.to_string()));
    payload.insert("source".to_string(), Value::String(source.to_string()));
    payload.insert("start_date".to_string(), Value::String(start_date.to_string()));

    let canonical = canonicalize(Value::Object(payload)).to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}

/// Readable key for a single-scene lookup.
pub fn make_observation_key(field_id: &str, obs_date: NaiveDate, source: &str) -> String {
    format!(
        "{}:{}:{}:{}",
        OBSERVATION_KEY_PREFIX, field_id, obs_date, source
    )
}

/// Rebuild objects with keys inserted in sorted order, at every depth.
///
/// serde_json keeps insertion order when `preserve_order` is enabled
/// anywhere in the dependency graph; sorting here keeps keys stable
/// regardless.
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map.into_iter().collect();
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
