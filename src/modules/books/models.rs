use pulse_kernel::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A book record as the service returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Server-assigned identifier
    pub id: u64,
    pub title: String,
    pub author: String,
}

/// Payload for creating a new book.
#[derive(Debug, Clone)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
}

impl From<CreateBook> for Record {
    fn from(book: CreateBook) -> Self {
        Record::from_iter([
            ("title".to_string(), Value::from(book.title)),
            ("author".to_string(), Value::from(book.author)),
        ])
    }
}
