// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Message schema adapter.
//!
//! The numeric mask core only needs three things from a message type:
//! its fields in declared order, lookup by field number, and for message
//! fields the nested type. [`MessageSchema`] is that seam.
//!
//! [`SchemaRegistry`] is the in-crate implementation: message types are
//! registered by full name and nested types are resolved lazily by name,
//! so self-referencing types (`Struct` -> `Value` -> `Struct`) work.
//!
//! # Example
//!
//! ```
//! use numeric_field_mask::schema::{FieldType, MessageSchema, MessageType, SchemaRegistry};
//!
//! let registry = SchemaRegistry::new();
//! registry.register(
//!     MessageType::new("demo.Point")
//!         .field(1, "x", FieldType::Int32)
//!         .field(2, "y", FieldType::Int32),
//! );
//!
//! let point = registry.descriptor("demo.Point").unwrap();
//! assert_eq!(point.field_count(), 2);
//! assert_eq!(point.field_by_number(2).unwrap().name, "y");
//! ```

mod registry;
mod well_known;

pub use registry::{FieldDefinition, FieldType, MessageDescriptor, MessageType, SchemaRegistry};
pub use well_known::well_known_types;

use crate::numeric::FieldNumber;

/// A field as seen through [`MessageSchema`].
#[derive(Debug, Clone)]
pub struct SchemaField<S> {
    pub number: FieldNumber,
    pub name: String,
    pub is_repeated: bool,
    /// True for message-typed fields, even when the nested type is unresolved.
    pub is_message: bool,
    /// Nested type for message fields (None for scalars and unresolved types).
    pub message_type: Option<S>,
}

impl<S> SchemaField<S> {
    /// Singular message field: the only kind a name path may pass through.
    #[must_use]
    pub fn is_singular_message(&self) -> bool {
        self.is_message && !self.is_repeated
    }
}

/// Read-only view of a message type's fields.
pub trait MessageSchema: Clone {
    /// Fully qualified type name; part of the mask cache key.
    fn full_name(&self) -> &str;

    /// Fields in declared order.
    fn fields(&self) -> Vec<SchemaField<Self>>;

    fn field_by_number(&self, number: FieldNumber) -> Option<SchemaField<Self>>;

    fn field_by_name(&self, name: &str) -> Option<SchemaField<Self>> {
        self.fields().into_iter().find(|f| f.name == name)
    }

    fn field_count(&self) -> usize {
        self.fields().len()
    }
}
