//! Content digests for artifact comparison
//!
//! Two runs over the same input produce the same digest even though their
//! `generated_at` stamps differ.

use crate::domain::{Result, TallyError};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// Field excluded from the content digest
pub const TIMESTAMP_FIELD: &str = "generated_at";

/// Calculate SHA-256 checksum of JSON data
///
/// Object keys are sorted recursively before hashing, so key order and
/// whitespace in the source do not affect the result.
///
/// # Examples
///
/// ```
/// use tally::core::verification::checksum::calculate_checksum;
/// use serde_json::json;
///
/// let checksum = calculate_checksum(&json!({"b": 1, "a": 2})).unwrap();
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn calculate_checksum(data: &Value) -> Result<String> {
    let normalized = normalize_json(data);
    let data_str = serde_json::to_string(&normalized)
        .map_err(|e| TallyError::Serialization(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(data_str.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Digest of the deterministic content of both artifacts
///
/// Everything except the top-level `generated_at` of each document is hashed.
pub fn content_digest(metrics: &Value, forecast: &Value) -> Result<String> {
    calculate_checksum(&json!({
        "metrics": without_timestamp(metrics),
        "forecast": without_timestamp(forecast),
    }))
}

fn without_timestamp(document: &Value) -> Value {
    let mut document = document.clone();
    if let Value::Object(map) = &mut document {
        map.remove(TIMESTAMP_FIELD);
    }
    document
}

/// Recursively sort object keys
fn normalize_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: std::collections::BTreeMap<String, Value> =
                std::collections::BTreeMap::new();
            for (k, v) in map {
                sorted.insert(k.clone(), normalize_json(v));
            }
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.iter().map(normalize_json).collect()),
        _ => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_ignores_key_order() {
        let a = json!({"kpis": {"total_encounters": 3, "avg_los_days": null}, "notes": []});
        let b = json!({"notes": [], "kpis": {"avg_los_days": null, "total_encounters": 3}});
        assert_eq!(calculate_checksum(&a).unwrap(), calculate_checksum(&b).unwrap());
    }

    #[test]
    fn test_checksum_respects_array_order() {
        let a = json!({"top_conditions": [{"code": "A"}, {"code": "B"}]});
        let b = json!({"top_conditions": [{"code": "B"}, {"code": "A"}]});
        assert_ne!(calculate_checksum(&a).unwrap(), calculate_checksum(&b).unwrap());
    }

    #[test]
    fn test_content_digest_ignores_generated_at() {
        let m1 = json!({"generated_at": "2025-01-01T00:00:00.000Z", "kpis": {"total_encounters": 1}});
        let m2 = json!({"generated_at": "2025-06-30T12:34:56.789Z", "kpis": {"total_encounters": 1}});
        let f1 = json!({"generated_at": "2025-01-01T00:00:00.000Z", "forecast": []});
        let f2 = json!({"generated_at": "2026-01-01T00:00:00.000Z", "forecast": []});

        assert_eq!(
            content_digest(&m1, &f1).unwrap(),
            content_digest(&m2, &f2).unwrap()
        );
    }

    #[test]
    fn test_content_digest_sees_data_changes() {
        let f = json!({"forecast": []});
        let m1 = json!({"kpis": {"total_encounters": 1}});
        let m2 = json!({"kpis": {"total_encounters": 2}});
        assert_ne!(content_digest(&m1, &f).unwrap(), content_digest(&m2, &f).unwrap());
    }
}
