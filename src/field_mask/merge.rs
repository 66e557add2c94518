// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Copy the fields selected by a [`FieldMask`] from one message into another.

use std::collections::BTreeMap;
use tracing::{trace, warn};

use super::{FieldMask, NAME_SEPARATOR};
use crate::message::{ReflectMessage, Value};
use crate::numeric::FieldNumber;
use crate::schema::{MessageSchema, SchemaField};

/// How selected fields that already hold a value in the destination are treated.
///
/// All flags default to `false` (merge/append semantics).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Replace message fields wholesale instead of merging into them.
    pub replace_message_fields: bool,
    /// Replace repeated fields instead of appending to them.
    pub replace_repeated_fields: bool,
    /// Clear primitive fields in the destination when unset in the source.
    pub replace_primitive_fields: bool,
}

impl MergeOptions {
    /// Replace everything: the destination ends up mirroring the source for
    /// every selected path.
    #[must_use]
    pub fn replace_all() -> Self {
        Self {
            replace_message_fields: true,
            replace_repeated_fields: true,
            replace_primitive_fields: true,
        }
    }
}

/// Name-keyed tree built from the mask's normalized paths.
#[derive(Debug, Default)]
struct PathNode {
    children: BTreeMap<String, PathNode>,
}

impl PathNode {
    fn from_mask(mask: &FieldMask) -> Self {
        let mut root = PathNode::default();
        for path in mask.normalize().paths() {
            let mut node = &mut root;
            for segment in path.split(NAME_SEPARATOR) {
                node = node.children.entry(segment.to_string()).or_default();
            }
        }
        root
    }

    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Merge the fields of `source` selected by `mask` into `destination`.
///
/// Paths that do not exist on the message type, or that try to pass
/// through a field that is not a singular message, are logged and skipped.
pub fn merge<M: ReflectMessage>(
    mask: &FieldMask,
    source: &M,
    destination: &mut M,
    options: &MergeOptions,
) {
    let tree = PathNode::from_mask(mask);
    merge_node(&tree, "", source, destination, options);
}

fn merge_node<M: ReflectMessage>(
    node: &PathNode,
    prefix: &str,
    source: &M,
    destination: &mut M,
    options: &MergeOptions,
) {
    let schema = source.schema();

    for (name, child) in &node.children {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}{NAME_SEPARATOR}{name}")
        };

        let Some(field) = schema.field_by_name(name) else {
            warn!(path = %path, message_type = schema.full_name(), "Field not found, ignoring path");
            continue;
        };

        if child.is_leaf() {
            trace!(path = %path, "Merging field");
            merge_leaf(&field, source, destination, options);
            continue;
        }

        if !field.is_singular_message() {
            warn!(
                path = %path,
                "Field is not a singular message field and cannot have sub-fields, ignoring path"
            );
            continue;
        }

        let number = field.number;
        if !source.has_field(number) && !destination.has_field(number) {
            continue;
        }

        let Some(empty) = source.new_nested(number) else {
            warn!(path = %path, "Nested message type unavailable, ignoring path");
            continue;
        };

        if destination.field(number).and_then(Value::as_message).is_none() {
            destination.set_field(number, Value::Message(Box::new(empty.clone())));
        }

        let source_sub = source
            .field(number)
            .and_then(Value::as_message)
            .unwrap_or(&empty);

        if let Some(destination_sub) = destination.field_mut(number).and_then(Value::as_message_mut) {
            merge_node(child, &path, source_sub, destination_sub, options);
        }
    }
}

fn merge_leaf<M: ReflectMessage>(
    field: &SchemaField<M::Schema>,
    source: &M,
    destination: &mut M,
    options: &MergeOptions,
) {
    let number = field.number;
    let source_value = source.field(number);

    if field.is_repeated {
        if options.replace_repeated_fields {
            replace_field(destination, number, source_value);
        } else if let Some(Value::List(items)) = source_value {
            match destination.field_mut(number) {
                Some(Value::List(existing)) => existing.extend(items.iter().cloned()),
                _ => destination.set_field(number, Value::List(items.clone())),
            }
        }
    } else if field.is_message {
        if options.replace_message_fields {
            replace_field(destination, number, source_value);
        } else if let Some(source_sub) = source_value.and_then(Value::as_message) {
            match destination.field_mut(number).and_then(Value::as_message_mut) {
                Some(destination_sub) => merge_message(destination_sub, source_sub),
                None => destination.set_field(number, Value::Message(Box::new(source_sub.clone()))),
            }
        }
    } else if source_value.is_some() || options.replace_primitive_fields {
        replace_field(destination, number, source_value);
    }
}

fn replace_field<M: ReflectMessage>(
    destination: &mut M,
    number: FieldNumber,
    value: Option<&Value<M>>,
) {
    match value {
        Some(value) => destination.set_field(number, value.clone()),
        None => destination.clear_field(number),
    }
}

/// Merge every set field of `source` into `destination`.
///
/// Singular scalars are overwritten, repeated fields appended, and singular
/// messages merged recursively.
pub fn merge_message<M: ReflectMessage>(destination: &mut M, source: &M) {
    let schema = source.schema();

    for number in source.set_fields() {
        let Some(value) = source.field(number) else {
            continue;
        };
        let field = schema.field_by_number(number);
        let is_singular_message = field.as_ref().is_some_and(SchemaField::is_singular_message);

        let merged_in_place = match (value, destination.field_mut(number)) {
            (Value::List(items), Some(Value::List(existing))) => {
                existing.extend(items.iter().cloned());
                true
            }
            (Value::Message(source_sub), Some(Value::Message(destination_sub))) if is_singular_message => {
                merge_message(destination_sub.as_mut(), source_sub.as_ref());
                true
            }
            _ => false,
        };

        if !merged_in_place {
            destination.set_field(number, value.clone());
        }
    }
}
