use crate::models::Metadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SUMMARY_KEY_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub model_tag: String,
    pub text: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NearestHit {
    pub id: String,
    pub text: String,
    pub metadata: Metadata,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Unchanged,
    Replaced,
}

/// Arrays become `<field>_count`, objects become `<field>_keys` (a JSON list of
/// their first five keys). Lossy: stores only accept flat scalar metadata.
pub fn scalar_safe_metadata(metadata: &Metadata) -> Metadata {
    let mut clean = Metadata::new();
    for (key, value) in metadata {
        match value {
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                clean.insert(key.clone(), value.clone());
            }
            Value::Array(items) => {
                clean.insert(format!("{key}_count"), Value::from(items.len()));
            }
            Value::Object(map) => {
                let keys = map
                    .keys()
                    .take(SUMMARY_KEY_LIMIT)
                    .cloned()
                    .map(Value::String)
                    .collect::<Vec<_>>();
                clean.insert(
                    format!("{key}_keys"),
                    Value::String(Value::Array(keys).to_string()),
                );
            }
        }
    }
    clean
}
