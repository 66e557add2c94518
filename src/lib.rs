//! # Numeric Field Mask
//!
//! Field masks addressed by field *number* instead of field name, resolved
//! against a message schema into ordinary name-based field masks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      NumericFieldMask                       │
//! │  • Dotted field-number paths ("5.1") + invert flag          │
//! │  • Order-independent equality, usable as a cache key        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     FieldMaskResolver                       │
//! │  • MaskCache (DashMap) keyed by (message type, mask)        │
//! │  • Inversion as a MaskTree difference against the schema    │
//! │  • Path codec: numbers → names via MessageSchema            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         FieldMask                           │
//! │  • Normalized name paths ("source_context.file_name")       │
//! │  • is_valid / merge with protobuf FieldMaskUtil semantics   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use numeric_field_mask::{
//!     DynamicMessage, FieldMaskResolver, NumericFieldMask, ReflectMessage, SchemaRegistry,
//! };
//!
//! let registry = SchemaRegistry::with_well_known_types();
//! let type_schema = registry.descriptor("google.protobuf.Type").unwrap();
//! let resolver = FieldMaskResolver::new();
//!
//! // "5.1" is Type.source_context (5) -> SourceContext.file_name (1)
//! let mask = NumericFieldMask::from_paths(["1", "5.1"]);
//! let names = resolver.to_field_mask(&type_schema, &mask).unwrap();
//! assert_eq!(names.paths(), ["name", "source_context.file_name"]);
//!
//! // Everything except name
//! let inverted = NumericFieldMask::from_paths(["1"]).with_invert(true);
//! let message = DynamicMessage::new(type_schema)
//!     .with(1, "demo.Thing")
//!     .with(6, numeric_field_mask::Value::Enum(1));
//! let copied = resolver.copy_requested_fields(&message, &inverted).unwrap();
//! assert!(!copied.has_field(1));
//! assert!(copied.has_field(6));
//! ```
//!
//! ## Configuration
//!
//! See [`FieldMaskConfig`] for cache bounds and copier merge options.
//!
//! ## Modules
//!
//! - [`numeric`]: Numeric masks, path codec, mask trees, resolver and cache
//! - [`field_mask`]: Name-based masks: normalize, validate, merge
//! - [`schema`]: Schema adapter trait and a runtime schema registry
//! - [`message`]: Reflection trait and a dynamic message implementation
//! - [`metrics`]: Cache and resolver metrics

pub mod config;
pub mod error;
pub mod field_mask;
pub mod message;
pub mod metrics;
pub mod numeric;
pub mod schema;

pub use config::FieldMaskConfig;
pub use error::{FieldMaskError, Result};
pub use field_mask::{merge, FieldMask, MergeOptions};
pub use message::{DynamicMessage, ReflectMessage, Value};
pub use numeric::{
    build_nested_path, invert_mask, is_all_fields, resolve_field_mask, EvictionPolicy, FieldMaskResolver,
    FieldNumber, MaskCache, MaskCacheStats, MaskTree, NumericFieldMask,
};
pub use schema::{FieldType, MessageDescriptor, MessageSchema, MessageType, SchemaRegistry};
