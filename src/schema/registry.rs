// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Registry of message type definitions.
//!
//! # Design
//!
//! - **Lazy nesting**: message fields name their nested type; it is looked up
//!   in the registry each time a descriptor is asked for it
//! - **Shared handle**: cloning a registry (or a descriptor) shares the same
//!   underlying table
//! - **Thread-safe**: uses `parking_lot::RwLock` for concurrent access

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::{well_known_types, MessageSchema, SchemaField};
use crate::error::{FieldMaskError, Result};
use crate::numeric::FieldNumber;

/// Declared type of a field.
///
/// Serialized in snake case; message fields carry the nested type's full
/// name, e.g. `{"message": "google.protobuf.Any"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Uint32,
    Bool,
    String,
    Bytes,
    Enum,
    Message(String),
}

impl FieldType {
    #[must_use]
    pub fn message_type_name(&self) -> Option<&str> {
        match self {
            Self::Message(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub number: FieldNumber,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub repeated: bool,
}

/// Definition of one message type: its full name and declared fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageType {
    pub full_name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

impl MessageType {
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a singular field.
    #[must_use]
    pub fn field(mut self, number: FieldNumber, name: &str, field_type: FieldType) -> Self {
        self.fields.push(FieldDefinition {
            number,
            name: name.to_string(),
            field_type,
            repeated: false,
        });
        self
    }

    /// Add a repeated field.
    #[must_use]
    pub fn repeated(mut self, number: FieldNumber, name: &str, field_type: FieldType) -> Self {
        self.fields.push(FieldDefinition {
            number,
            name: name.to_string(),
            field_type,
            repeated: true,
        });
        self
    }

    /// Convenience for a singular message field.
    #[must_use]
    pub fn message(self, number: FieldNumber, name: &str, type_name: &str) -> Self {
        self.field(number, name, FieldType::Message(type_name.to_string()))
    }
}

type TypeTable = HashMap<String, Arc<MessageType>>;

/// Registry mapping full type names to message definitions.
///
/// Thread-safe for concurrent reads with occasional writes.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: Arc<RwLock<TypeTable>>,
}

impl SchemaRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the `google.protobuf` well-known types.
    #[must_use]
    pub fn with_well_known_types() -> Self {
        let registry = Self::new();
        for message_type in well_known_types() {
            registry.register(message_type);
        }
        registry
    }

    /// Register (or replace) a message type.
    ///
    /// Replacing a type does not reach resolvers: masks already cached
    /// against the old definition are still served until
    /// [`MaskCache::clear`](crate::MaskCache::clear) is called.
    pub fn register(&self, message_type: MessageType) {
        debug!(
            full_name = %message_type.full_name,
            fields = message_type.fields.len(),
            "Registering message type"
        );
        self.types
            .write()
            .insert(message_type.full_name.clone(), Arc::new(message_type));
    }

    /// Register message types from a JSON array of [`MessageType`] definitions.
    ///
    /// Returns the number of types registered.
    pub fn register_json(&self, json: &str) -> Result<usize> {
        let message_types: Vec<MessageType> = serde_json::from_str(json)?;
        let count = message_types.len();
        for message_type in message_types {
            self.register(message_type);
        }
        Ok(count)
    }

    /// Unregister a type.
    ///
    /// Returns `true` if the type was found and removed.
    pub fn unregister(&self, full_name: &str) -> bool {
        self.types.write().remove(full_name).is_some()
    }

    /// Descriptor for a registered type.
    pub fn descriptor(&self, full_name: &str) -> Result<MessageDescriptor> {
        self.lookup(full_name)
            .ok_or_else(|| FieldMaskError::UnknownMessageType {
                name: full_name.to_string(),
            })
    }

    fn lookup(&self, full_name: &str) -> Option<MessageDescriptor> {
        let message = self.types.read().get(full_name).cloned()?;
        Some(MessageDescriptor {
            registry: self.clone(),
            message,
        })
    }

    /// Registered type names, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.read().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    pub fn clear(&self) {
        self.types.write().clear();
    }
}

/// Handle to one registered message type.
///
/// Holds a snapshot of the type's definition; nested types are looked up
/// in the owning registry on demand.
#[derive(Clone)]
pub struct MessageDescriptor {
    registry: SchemaRegistry,
    message: Arc<MessageType>,
}

impl MessageDescriptor {
    /// Raw field definitions in declared order.
    #[must_use]
    pub fn definitions(&self) -> &[FieldDefinition] {
        &self.message.fields
    }

    #[must_use]
    pub fn definition(&self, number: FieldNumber) -> Option<&FieldDefinition> {
        self.message.fields.iter().find(|f| f.number == number)
    }

    fn to_schema_field(&self, definition: &FieldDefinition) -> SchemaField<Self> {
        let message_type = definition
            .field_type
            .message_type_name()
            .and_then(|name| self.registry.lookup(name));

        SchemaField {
            number: definition.number,
            name: definition.name.clone(),
            is_repeated: definition.repeated,
            is_message: matches!(definition.field_type, FieldType::Message(_)),
            message_type,
        }
    }
}

impl MessageSchema for MessageDescriptor {
    fn full_name(&self) -> &str {
        &self.message.full_name
    }

    fn fields(&self) -> Vec<SchemaField<Self>> {
        self.message
            .fields
            .iter()
            .map(|definition| self.to_schema_field(definition))
            .collect()
    }

    fn field_by_number(&self, number: FieldNumber) -> Option<SchemaField<Self>> {
        self.definition(number).map(|d| self.to_schema_field(d))
    }

    fn field_count(&self) -> usize {
        self.message.fields.len()
    }
}

/// Equal when the full names match, even across re-registration.
impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.message.full_name == other.message.full_name
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("full_name", &self.message.full_name)
            .field("fields", &self.message.fields.len())
            .finish()
    }
}
