//! # xmlschema-codec
//!
//! Schema-driven XML serialization: XSD documents are merged into one
//! registry, named types are flattened into effective shapes, and the shapes
//! drive a lossless codec between XML text and structured records.
//!
//! ## Features
//!
//! - XSD text parsing into an immutable document model
//! - Import, include, chameleon include and redefine across caller-supplied documents
//! - Inheritance flattening with occurrence combination and memoized shapes
//! - XML ⇄ record transcoding whose encode and decode are exact inverses
//! - JSON bridge for records
//! - Protection against oversized or deeply nested input
//!
//! ## Example
//!
//! ```rust,ignore
//! use xmlschema_codec::{Decoder, Encoder, QName, SchemaLoader, ShapeResolver};
//!
//! let mut loader = SchemaLoader::new();
//! loader.add_source("person.xsd", xsd)?;
//! let registry = loader.load("person.xsd")?;
//!
//! let mut resolver = ShapeResolver::new(&registry);
//! let person = resolver.resolve(&QName::namespaced("urn:people", "Person"))?;
//! let shapes = resolver.into_shapes();
//!
//! let record = Decoder::new(&shapes).decode(person, r#"<person name="Bob" age="25"/>"#)?;
//! let xml = Encoder::new(&shapes).encode(&QName::local("person"), person, &record)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod locations;
pub mod names;
pub mod namespaces;

// XML trees
pub mod documents;

// Schema model and loading
pub mod loaders;
pub mod schema;

// Shape resolution
pub mod shapes;

// Transcoding
pub mod codec;

// Re-exports for convenience
pub use codec::{Decoder, DecoderConfig, Encoder, EncoderConfig, JsonBridge, Record, ScalarValue, Value};
pub use error::{DecodeError, DefinitionKind, EncodeError, Error, ParseError, Result, StructuralError};
pub use limits::Limits;
pub use loaders::SchemaLoader;
pub use namespaces::QName;
pub use schema::{SchemaDocument, SchemaRegistry};
pub use shapes::{EffectiveShape, ElementSlot, ShapeArena, ShapeId, ShapeResolver};

/// Version of the xmlschema-codec library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XSD namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace (xsi:nil, xsi:type)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
