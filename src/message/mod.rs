// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Reflective message access.
//!
//! The field copier never looks inside messages itself; it hands a resolved
//! [`FieldMask`](crate::field_mask::FieldMask) to the merge facility, which
//! walks messages through [`ReflectMessage`]. [`DynamicMessage`] implements
//! it on top of a [`MessageDescriptor`](crate::schema::MessageDescriptor).

mod dynamic;

pub use dynamic::DynamicMessage;

use crate::numeric::FieldNumber;
use crate::schema::MessageSchema;

/// A field value. Repeated fields hold a [`Value::List`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value<M = DynamicMessage> {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Enum(i32),
    Message(Box<M>),
    List(Vec<Value<M>>),
}

impl<M> Value<M> {
    #[must_use]
    pub fn as_message(&self) -> Option<&M> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_message_mut(&mut self) -> Option<&mut M> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value<M>]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl<M> From<&str> for Value<M> {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl<M> From<i64> for Value<M> {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl<M> From<bool> for Value<M> {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Field-level read/write access to a message.
pub trait ReflectMessage: Clone + Sized {
    type Schema: MessageSchema;

    fn schema(&self) -> Self::Schema;

    /// A fresh, empty message of the same type.
    fn new_for_type(&self) -> Self;

    /// A fresh, empty message of the nested type of field `number`.
    fn new_nested(&self, number: FieldNumber) -> Option<Self>;

    fn has_field(&self, number: FieldNumber) -> bool;

    fn field(&self, number: FieldNumber) -> Option<&Value<Self>>;

    fn field_mut(&mut self, number: FieldNumber) -> Option<&mut Value<Self>>;

    fn set_field(&mut self, number: FieldNumber, value: Value<Self>);

    fn clear_field(&mut self, number: FieldNumber);

    /// Numbers of the fields currently set, ascending.
    fn set_fields(&self) -> Vec<FieldNumber>;
}
