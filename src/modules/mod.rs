pub mod books;
pub mod roles;

use pulse_kernel::ResourceRegistry;

/// Register every resource the suite covers, in run order
pub fn register_all(registry: &mut ResourceRegistry) {
    registry.register(books::create_resource());
    registry.register(roles::create_resource());
}

/// Registry preloaded with every resource
pub fn default_registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    register_all(&mut registry);
    registry
}
