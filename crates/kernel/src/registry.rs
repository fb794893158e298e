use std::sync::Arc;

use crate::resource::Resource;

/// Ordered set of resources a conformance run covers
pub struct ResourceRegistry {
    resources: Vec<Arc<dyn Resource>>,
}

impl ResourceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Register a resource; later registrations with the same name are ignored
    pub fn register(&mut self, resource: Arc<dyn Resource>) {
        if self.get(resource.name()).is_some() {
            tracing::warn!(
                resource = resource.name(),
                "resource already registered, ignoring duplicate"
            );
            return;
        }
        tracing::debug!(resource = resource.name(), "registered resource");
        self.resources.push(resource);
    }

    /// All registered resources in registration order
    pub fn resources(&self) -> &[Arc<dyn Resource>] {
        &self.resources
    }

    /// Look a resource up by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Resource>> {
        self.resources
            .iter()
            .find(|resource| resource.name() == name)
    }

    /// Registered resource names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.resources.iter().map(|resource| resource.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use serde_json::Value;

    struct Named(&'static str);

    impl Resource for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn misspelled_collection(&self) -> &'static str {
            "nope"
        }

        fn sample(&self) -> Record {
            Record::new()
        }

        fn required_fields(&self) -> &'static [&'static str] {
            &[]
        }

        fn partial_update(&self) -> Record {
            Record::new()
        }

        fn check_shape(&self, _value: &Value) -> Result<(), serde_json::Error> {
            Ok(())
        }
    }

    #[test]
    fn registry_starts_empty() {
        let registry = ResourceRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("books").is_none());
    }

    #[test]
    fn registration_order_is_kept() {
        let mut registry = ResourceRegistry::new();
        registry.register(Arc::new(Named("books")));
        registry.register(Arc::new(Named("roles")));

        assert_eq!(registry.names(), vec!["books", "roles"]);
        assert_eq!(registry.get("roles").map(|r| r.name()), Some("roles"));
    }

    #[test]
    fn duplicate_names_are_ignored() {
        let mut registry = ResourceRegistry::new();
        registry.register(Arc::new(Named("books")));
        registry.register(Arc::new(Named("books")));
        assert_eq!(registry.len(), 1);
    }
}
