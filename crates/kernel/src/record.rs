//! JSON record helpers shared by resource descriptors and the suite runner.

use serde_json::{Map, Value};

/// A single resource record as a JSON object, keyed by field name.
pub type Record = Map<String, Value>;

/// Field name carrying the server-assigned identifier.
pub const ID_FIELD: &str = "id";

/// Extract the server-assigned id from a record-shaped JSON value.
pub fn id_of(value: &Value) -> Option<u64> {
    value.get(ID_FIELD).and_then(Value::as_u64)
}

/// Copy of `record` with `id` set.
pub fn with_id(record: &Record, id: u64) -> Record {
    let mut out = record.clone();
    out.insert(ID_FIELD.to_string(), Value::from(id));
    out
}

/// Copy of `record` with `field` replaced by an empty string.
pub fn blanked(record: &Record, field: &str) -> Record {
    let mut out = record.clone();
    out.insert(field.to_string(), Value::String(String::new()));
    out
}

/// Copy of `record` without `field`.
pub fn without(record: &Record, field: &str) -> Record {
    let mut out = record.clone();
    out.remove(field);
    out
}

/// Copy of `record` with every field replaced by an empty string.
pub fn all_blank(record: &Record) -> Record {
    record
        .keys()
        .map(|key| (key.clone(), Value::String(String::new())))
        .collect()
}

/// Apply a partial update: fields of `patch` that `record` already knows
/// overwrite it, anything else is dropped.
pub fn merge_known(record: &Record, patch: &Record) -> Record {
    let mut out = record.clone();
    for (key, value) in patch {
        if key != ID_FIELD && out.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}
