//! Shared building blocks for pulse conformance runs: layered settings, the
//! [`Resource`] descriptor trait and the registry that holds them.

pub mod record;
pub mod registry;
pub mod resource;
pub mod settings;

pub use record::Record;
pub use registry::ResourceRegistry;
pub use resource::Resource;
