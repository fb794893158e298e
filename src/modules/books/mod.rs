pub mod models;

use std::sync::Arc;

use pulse_kernel::{Record, Resource};
use serde::Deserialize;
use serde_json::Value;

/// The `books` collection
pub struct BooksResource;

impl BooksResource {
    pub const fn new() -> Self {
        Self
    }
}

impl Resource for BooksResource {
    fn name(&self) -> &'static str {
        "books"
    }

    fn misspelled_collection(&self) -> &'static str {
        "boooks"
    }

    fn sample(&self) -> Record {
        Record::from(models::CreateBook {
            title: "Ender's Game".to_string(),
            author: "Orson Scott Card".to_string(),
        })
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["title", "author"]
    }

    fn partial_update(&self) -> Record {
        let mut patch = Record::new();
        patch.insert(
            "title".to_string(),
            Value::String("Speaker for the Dead".to_string()),
        );
        patch
    }

    fn check_shape(&self, value: &Value) -> Result<(), serde_json::Error> {
        models::Book::deserialize(value).map(|_| ())
    }
}

/// Create a new instance of the books resource
pub fn create_resource() -> Arc<dyn Resource> {
    Arc::new(BooksResource::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sample_matches_enders_game() {
        let sample = BooksResource.sample();
        assert_eq!(
            Value::Object(sample),
            json!({"title": "Ender's Game", "author": "Orson Scott Card"})
        );
    }

    #[test]
    fn every_sample_field_is_required() {
        let sample = BooksResource.sample();
        for field in BooksResource.required_fields() {
            assert!(sample.contains_key(*field), "sample lacks {field}");
        }
    }

    #[test]
    fn shape_check_accepts_records_and_rejects_listings() {
        let record = json!({"id": 12, "title": "Ender's Game", "author": "Orson Scott Card"});
        assert!(BooksResource.check_shape(&record).is_ok());
        assert!(BooksResource.check_shape(&json!([record])).is_err());
        assert!(BooksResource.check_shape(&json!({"title": "x"})).is_err());
    }
}
