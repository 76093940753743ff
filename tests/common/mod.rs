//! Shared helpers for integration tests

#![allow(dead_code)]

use xmlschema_codec::{ElementSlot, QName, SchemaLoader, SchemaRegistry, ShapeArena, ShapeId, ShapeResolver};

/// Load inline documents; the first one is the entry document
pub fn load(sources: &[(&str, &str)]) -> SchemaRegistry {
    let mut loader = SchemaLoader::new();
    for (id, xsd) in sources {
        loader.add_source(*id, xsd).unwrap_or_else(|e| panic!("failed to parse {}: {}", id, e));
    }
    loader
        .load(sources[0].0)
        .unwrap_or_else(|e| panic!("failed to load {}: {}", sources[0].0, e))
}

/// Resolve a named type and hand back the arena
pub fn resolve_type(registry: &SchemaRegistry, name: &QName) -> (ShapeArena, ShapeId) {
    let mut resolver = ShapeResolver::new(registry);
    let id = resolver.resolve(name).unwrap_or_else(|e| panic!("failed to resolve {}: {}", name, e));
    (resolver.into_shapes(), id)
}

/// Resolve a global element and hand back the arena
pub fn resolve_element(registry: &SchemaRegistry, name: &QName) -> (ShapeArena, ElementSlot) {
    let mut resolver = ShapeResolver::new(registry);
    let slot = resolver
        .resolve_element(name)
        .unwrap_or_else(|e| panic!("failed to resolve element {}: {}", name, e));
    (resolver.into_shapes(), slot)
}
