use serde_json::Value;

use crate::record::{self, Record};

/// Descriptor for one REST resource exercised by the conformance suite.
///
/// Implementations describe payloads and paths only; the suite runner owns
/// all HTTP traffic.
pub trait Resource: Sync + Send {
    /// Unique name for this resource, also used in case names
    fn name(&self) -> &'static str;

    /// Path segment of the collection URL (`/{collection}/`)
    fn collection(&self) -> &'static str {
        self.name()
    }

    /// A collection segment the service must not know about
    fn misspelled_collection(&self) -> &'static str;

    /// Valid create payload without an id
    fn sample(&self) -> Record;

    /// Fields the service must reject when empty or absent
    fn required_fields(&self) -> &'static [&'static str];

    /// Partial update touching at least one recognized field
    fn partial_update(&self) -> Record;

    /// Update payload made only of fields the service does not recognize
    fn unknown_field_update(&self) -> Record {
        let mut patch = Record::new();
        patch.insert("year".to_string(), Value::String("1986".to_string()));
        patch
    }

    /// Sample payload with every field emptied
    fn blank(&self) -> Record {
        record::all_blank(&self.sample())
    }

    /// Check that a response body has the shape of one record
    fn check_shape(&self, value: &Value) -> Result<(), serde_json::Error>;
}
