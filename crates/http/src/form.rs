//! Form encoding of JSON records.

use pulse_kernel::Record;
use serde_json::Value;

/// Flatten a record into `application/x-www-form-urlencoded` pairs.
///
/// Strings go out verbatim, numbers and booleans in their JSON spelling,
/// null as an empty value. Nested values are sent as compact JSON text.
pub fn form_pairs(record: &Record) -> Vec<(String, String)> {
    record
        .iter()
        .map(|(key, value)| (key.clone(), form_value(value)))
        .collect()
}

fn form_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        nested @ (Value::Array(_) | Value::Object(_)) => nested.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_are_flattened() {
        let record = json!({
            "name": "Roland Deschain",
            "level": 80,
            "active": true,
            "book": null,
        });
        let mut pairs = form_pairs(record.as_object().unwrap());
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                ("active".to_string(), "true".to_string()),
                ("book".to_string(), String::new()),
                ("level".to_string(), "80".to_string()),
                ("name".to_string(), "Roland Deschain".to_string()),
            ]
        );
    }

    #[test]
    fn empty_record_has_no_pairs() {
        assert!(form_pairs(&Record::new()).is_empty());
    }
}
