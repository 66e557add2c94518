// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! `google.protobuf` well-known types with their published field numbers.

use super::{FieldType, MessageType};

const ANY: &str = "google.protobuf.Any";
const OPTION: &str = "google.protobuf.Option";
const SOURCE_CONTEXT: &str = "google.protobuf.SourceContext";

/// Definitions for the well-known types used by type/field reflection.
#[must_use]
pub fn well_known_types() -> Vec<MessageType> {
    vec![
        MessageType::new("google.protobuf.Timestamp")
            .field(1, "seconds", FieldType::Int64)
            .field(2, "nanos", FieldType::Int32),
        MessageType::new("google.protobuf.Duration")
            .field(1, "seconds", FieldType::Int64)
            .field(2, "nanos", FieldType::Int32),
        MessageType::new("google.protobuf.Empty"),
        MessageType::new(ANY)
            .field(1, "type_url", FieldType::String)
            .field(2, "value", FieldType::Bytes),
        MessageType::new(SOURCE_CONTEXT).field(1, "file_name", FieldType::String),
        MessageType::new(OPTION)
            .field(1, "name", FieldType::String)
            .message(2, "value", ANY),
        MessageType::new("google.protobuf.Field")
            .field(1, "kind", FieldType::Enum)
            .field(2, "cardinality", FieldType::Enum)
            .field(3, "number", FieldType::Int32)
            .field(4, "name", FieldType::String)
            .field(6, "type_url", FieldType::String)
            .field(7, "oneof_index", FieldType::Int32)
            .field(8, "packed", FieldType::Bool)
            .repeated(9, "options", FieldType::Message(OPTION.into()))
            .field(10, "json_name", FieldType::String)
            .field(11, "default_value", FieldType::String),
        MessageType::new("google.protobuf.Type")
            .field(1, "name", FieldType::String)
            .repeated(2, "fields", FieldType::Message("google.protobuf.Field".into()))
            .repeated(3, "oneofs", FieldType::String)
            .repeated(4, "options", FieldType::Message(OPTION.into()))
            .message(5, "source_context", SOURCE_CONTEXT)
            .field(6, "syntax", FieldType::Enum)
            .field(7, "edition", FieldType::String),
        MessageType::new("google.protobuf.EnumValue")
            .field(1, "name", FieldType::String)
            .field(2, "number", FieldType::Int32)
            .repeated(3, "options", FieldType::Message(OPTION.into())),
        MessageType::new("google.protobuf.Enum")
            .field(1, "name", FieldType::String)
            .repeated(2, "enumvalue", FieldType::Message("google.protobuf.EnumValue".into()))
            .repeated(3, "options", FieldType::Message(OPTION.into()))
            .message(4, "source_context", SOURCE_CONTEXT)
            .field(5, "syntax", FieldType::Enum)
            .field(6, "edition", FieldType::String),
    ]
}
