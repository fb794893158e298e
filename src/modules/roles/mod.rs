pub mod models;

use std::sync::Arc;

use pulse_kernel::{Record, Resource};
use serde::Deserialize;
use serde_json::Value;

/// The `roles` collection
pub struct RolesResource;

impl RolesResource {
    pub const fn new() -> Self {
        Self
    }
}

impl Resource for RolesResource {
    fn name(&self) -> &'static str {
        "roles"
    }

    fn misspelled_collection(&self) -> &'static str {
        "roooles"
    }

    fn sample(&self) -> Record {
        Record::from(models::CreateRole {
            name: "Roland Deschain".to_string(),
            kind: "The Gunslinger".to_string(),
            level: 80,
            book: 422,
        })
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["name", "type"]
    }

    fn partial_update(&self) -> Record {
        let mut patch = Record::new();
        patch.insert("level".to_string(), Value::from(88));
        patch
    }

    fn check_shape(&self, value: &Value) -> Result<(), serde_json::Error> {
        models::Role::deserialize(value).map(|_| ())
    }
}

/// Create a new instance of the roles resource
pub fn create_resource() -> Arc<dyn Resource> {
    Arc::new(RolesResource::new())
}
