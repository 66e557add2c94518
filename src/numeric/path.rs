// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Numeric path codec.
//!
//! `"1.2.3"` <-> `[1, 2, 3]`, and `[5, 1]` -> `"source_context.file_name"`
//! by walking the schema one segment at a time.

use super::FieldNumber;
use crate::error::{FieldMaskError, Result};
use crate::schema::MessageSchema;

/// Separator between the field numbers (and names) of a path.
pub const PATH_SEPARATOR: char = '.';

/// Split a numeric path into its field numbers.
///
/// Every segment must be a non-empty run of ASCII digits that fits a
/// [`FieldNumber`]; `"1."`, `".1"`, `"1..2"`, `"+1"` and `"seconds"` are
/// all rejected with [`FieldMaskError::MalformedPath`].
pub fn parse_path(path: &str) -> Result<Vec<FieldNumber>> {
    if path.is_empty() {
        return Err(malformed(path, "path is empty".into()));
    }

    path.split(PATH_SEPARATOR)
        .enumerate()
        .map(|(position, segment)| parse_segment(path, position, segment))
        .collect()
}

fn parse_segment(path: &str, position: usize, segment: &str) -> Result<FieldNumber> {
    if segment.is_empty() {
        return Err(malformed(path, format!("empty segment at position {position}")));
    }
    if !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(
            path,
            format!("segment '{segment}' is not a field number"),
        ));
    }
    segment
        .parse::<FieldNumber>()
        .map_err(|_| malformed(path, format!("segment '{segment}' is out of range")))
}

fn malformed(path: &str, reason: String) -> FieldMaskError {
    FieldMaskError::MalformedPath {
        path: path.to_string(),
        reason,
    }
}

/// Build a numeric path from field numbers: `[1, 2, 3]` -> `"1.2.3"`.
#[must_use]
pub fn build_nested_path(numbers: &[FieldNumber]) -> String {
    let mut path = String::with_capacity(numbers.len() * 2);
    for (i, number) in numbers.iter().enumerate() {
        if i > 0 {
            path.push(PATH_SEPARATOR);
        }
        path.push_str(&number.to_string());
    }
    path
}

/// Join name segments with the separator, skipping `None`s.
#[must_use]
pub fn join_names<'a, I>(segments: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut joined = String::new();
    for segment in segments.into_iter().flatten() {
        if !joined.is_empty() {
            joined.push(PATH_SEPARATOR);
        }
        joined.push_str(segment);
    }
    joined
}

/// Parse and resolve a numeric path to its name path.
pub fn resolve_path<S: MessageSchema>(schema: &S, path: &str) -> Result<String> {
    let numbers = parse_path(path)?;
    resolve_numbers(schema, &numbers, path)
}

/// Resolve field numbers to a name path, starting at `schema`.
///
/// `path` is only used for error reporting.
pub fn resolve_numbers<S: MessageSchema>(
    schema: &S,
    numbers: &[FieldNumber],
    path: &str,
) -> Result<String> {
    let Some((&number, rest)) = numbers.split_first() else {
        return Err(malformed(path, "path is empty".into()));
    };

    let field = schema
        .field_by_number(number)
        .ok_or_else(|| FieldMaskError::UnknownField {
            path: path.to_string(),
            field_number: number,
            message_type: schema.full_name().to_string(),
        })?;

    if rest.is_empty() {
        return Ok(field.name);
    }

    let invalid = |reason: &str| FieldMaskError::InvalidFieldMask {
        path: path.to_string(),
        field: field.name.clone(),
        message_type: schema.full_name().to_string(),
        reason: reason.to_string(),
    };

    if !field.is_message {
        return Err(invalid("is not a message field and has no sub-fields"));
    }
    let Some(nested) = &field.message_type else {
        return Err(invalid("refers to an unregistered message type"));
    };

    let suffix = resolve_numbers(nested, rest, path)?;
    Ok(join_names([Some(field.name.as_str()), Some(suffix.as_str())]))
}
