//! Registry configuration for the DXL vocabulary.

use super::core::HandlerRegistry;
use super::handlers::{clause, descriptors, logical, metadata, physical, scalar, sections};

/// Create a registry with a table entry for every node kind.
///
/// This is the table behind [`REGISTRY`](super::core::REGISTRY); build a
/// separate one only to inspect or test grammars.
#[must_use]
pub fn create_dxl_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();

    // Document structure
    sections::register(&mut registry);
    descriptors::register(&mut registry);

    // Operators
    scalar::register(&mut registry);
    clause::register(&mut registry);
    logical::register(&mut registry);
    physical::register(&mut registry);

    // Catalog objects
    metadata::register(&mut registry);

    tracing::debug!(kinds = registry.len(), "DXL registry built");
    registry
}
