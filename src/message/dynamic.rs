// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::collections::BTreeMap;

use super::{ReflectMessage, Value};
use crate::numeric::FieldNumber;
use crate::schema::{MessageDescriptor, MessageSchema};

/// A message whose layout is only known at runtime.
///
/// Unset fields are absent from the map; empty lists count as unset.
#[derive(Debug, Clone)]
pub struct DynamicMessage {
    descriptor: MessageDescriptor,
    fields: BTreeMap<FieldNumber, Value>,
}

impl DynamicMessage {
    #[must_use]
    pub fn new(descriptor: MessageDescriptor) -> Self {
        Self {
            descriptor,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style [`ReflectMessage::set_field`].
    #[must_use]
    pub fn with(mut self, number: FieldNumber, value: impl Into<Value>) -> Self {
        self.set_field(number, value.into());
        self
    }

    /// Builder-style setter for a repeated field.
    #[must_use]
    pub fn with_list(self, number: FieldNumber, items: Vec<Value>) -> Self {
        self.with(number, Value::List(items))
    }

    /// Builder-style setter for a nested message.
    #[must_use]
    pub fn with_message(self, number: FieldNumber, message: DynamicMessage) -> Self {
        self.with(number, Value::Message(Box::new(message)))
    }

    #[must_use]
    pub fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Lookup by field name (convenience for tests and callers holding names).
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&Value> {
        let number = self.descriptor.definitions().iter().find(|d| d.name == name)?.number;
        self.fields.get(&number)
    }
}

impl ReflectMessage for DynamicMessage {
    type Schema = MessageDescriptor;

    fn schema(&self) -> MessageDescriptor {
        self.descriptor.clone()
    }

    fn new_for_type(&self) -> Self {
        Self::new(self.descriptor.clone())
    }

    fn new_nested(&self, number: FieldNumber) -> Option<Self> {
        self.descriptor
            .field_by_number(number)?
            .message_type
            .map(Self::new)
    }

    fn has_field(&self, number: FieldNumber) -> bool {
        self.fields.contains_key(&number)
    }

    fn field(&self, number: FieldNumber) -> Option<&Value> {
        self.fields.get(&number)
    }

    fn field_mut(&mut self, number: FieldNumber) -> Option<&mut Value> {
        self.fields.get_mut(&number)
    }

    fn set_field(&mut self, number: FieldNumber, value: Value) {
        if matches!(&value, Value::List(items) if items.is_empty()) {
            self.fields.remove(&number);
        } else {
            self.fields.insert(number, value);
        }
    }

    fn clear_field(&mut self, number: FieldNumber) {
        self.fields.remove(&number);
    }

    fn set_fields(&self) -> Vec<FieldNumber> {
        self.fields.keys().copied().collect()
    }
}

impl PartialEq for DynamicMessage {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor == other.descriptor && self.fields == other.fields
    }
}
