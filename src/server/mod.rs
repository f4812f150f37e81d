//! HTTP server: shared state, resource registry, builder and REST exposure

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod host;

pub use builder::{ServerBuilder, serve};
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use host::{AppState, ServerHost};
