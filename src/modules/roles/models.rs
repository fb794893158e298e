use pulse_kernel::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A role record as the service returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Server-assigned identifier
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: Option<i64>,
    /// Id of the book this role appears in
    pub book: Option<u64>,
}

/// Payload for creating a new role.
#[derive(Debug, Clone)]
pub struct CreateRole {
    pub name: String,
    /// Sent as `type`
    pub kind: String,
    pub level: i64,
    pub book: u64,
}

impl From<CreateRole> for Record {
    fn from(role: CreateRole) -> Self {
        Record::from_iter([
            ("name".to_string(), Value::from(role.name)),
            ("type".to_string(), Value::from(role.kind)),
            ("level".to_string(), Value::from(role.level)),
            ("book".to_string(), Value::from(role.book)),
        ])
    }
}
