// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Name-based field masks.
//!
//! A [`FieldMask`] lists dotted field-name paths (`"source_context.file_name"`).
//! This is the form the numeric resolver produces and the form the merge
//! facility consumes.
//!
//! # Normal form
//!
//! ```text
//! ["b", "a.x", "a", "b"]  ──normalize──▶  ["a", "b"]
//! ```
//!
//! Paths are sorted, duplicates removed, and any path whose ancestor is
//! already present is dropped (selecting `a` already selects `a.x`).

mod merge;

pub use merge::{merge, merge_message, MergeOptions};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::schema::MessageSchema;

/// Separator between the names of a field path.
pub const NAME_SEPARATOR: char = '.';

/// A set of field-name paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldMask {
    #[serde(default)]
    paths: Vec<String>,
}

impl FieldMask {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mask from paths as given (not normalized).
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn add_path(&mut self, path: impl Into<String>) {
        self.paths.push(path.into());
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Sorted, deduplicated, with descendants of selected ancestors removed.
    #[must_use]
    pub fn normalize(&self) -> FieldMask {
        let sorted: BTreeSet<&str> = self
            .paths
            .iter()
            .map(String::as_str)
            .filter(|p| !p.is_empty())
            .collect();

        let paths = sorted
            .iter()
            .filter(|path| !has_ancestor_in(path, &sorted))
            .map(|path| (*path).to_string())
            .collect();

        FieldMask { paths }
    }

    /// Normalized union of two masks.
    #[must_use]
    pub fn union(&self, other: &FieldMask) -> FieldMask {
        let mut combined = self.clone();
        combined.paths.extend(other.paths.iter().cloned());
        combined.normalize()
    }

    /// Whether every path names existing fields of `schema`.
    ///
    /// Every segment but the last must be a singular message field; the
    /// last may be any field.
    pub fn is_valid<S: MessageSchema>(&self, schema: &S) -> bool {
        self.paths.iter().all(|path| is_valid_path(schema, path))
    }
}

fn has_ancestor_in(path: &str, paths: &BTreeSet<&str>) -> bool {
    path.match_indices(NAME_SEPARATOR)
        .any(|(idx, _)| paths.contains(&path[..idx]))
}

fn is_valid_path<S: MessageSchema>(schema: &S, path: &str) -> bool {
    let mut current = schema.clone();
    let mut segments = path.split(NAME_SEPARATOR).peekable();

    while let Some(name) = segments.next() {
        let Some(field) = current.field_by_name(name) else {
            return false;
        };
        if segments.peek().is_none() {
            return true;
        }
        match field.message_type {
            Some(nested) if !field.is_repeated => current = nested,
            _ => return false,
        }
    }

    false
}

impl fmt::Display for FieldMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.paths.join(","))
    }
}

impl<S: Into<String>> FromIterator<S> for FieldMask {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_paths(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    #[test]
    fn test_normalize_sorts_and_dedups() {
        let mask = FieldMask::from_paths(["b", "a", "b", ""]);
        assert_eq!(mask.normalize().paths(), ["a", "b"]);
    }

    #[test]
    fn test_normalize_removes_covered_descendants() {
        let mask = FieldMask::from_paths(["a.x.y", "a.x", "ab.c", "a-b", "c.d"]);
        assert_eq!(mask.normalize().paths(), ["a-b", "a.x", "ab.c", "c.d"]);
    }

    #[test]
    fn test_normalize_keeps_siblings_sharing_prefix() {
        let mask = FieldMask::from_paths(["options.value", "options_extra"]);
        assert_eq!(mask.normalize().paths(), ["options.value", "options_extra"]);
    }

    #[test]
    fn test_union() {
        let a = FieldMask::from_paths(["source_context.file_name"]);
        let b = FieldMask::from_paths(["source_context", "name"]);
        assert_eq!(a.union(&b).paths(), ["name", "source_context"]);
    }

    #[test]
    fn test_is_valid() {
        let registry = SchemaRegistry::with_well_known_types();
        let type_descriptor = registry.descriptor("google.protobuf.Type").unwrap();

        assert!(FieldMask::from_paths(["name", "source_context.file_name"]).is_valid(&type_descriptor));
        assert!(FieldMask::from_paths(["options"]).is_valid(&type_descriptor));
        // Repeated message fields cannot be descended into
        assert!(!FieldMask::from_paths(["options.value"]).is_valid(&type_descriptor));
        // Scalars have no sub-fields
        assert!(!FieldMask::from_paths(["name.x"]).is_valid(&type_descriptor));
        assert!(!FieldMask::from_paths(["missing"]).is_valid(&type_descriptor));
        assert!(!FieldMask::from_paths(["source_context."]).is_valid(&type_descriptor));
    }

    #[test]
    fn test_display_and_collect() {
        let mask: FieldMask = ["seconds", "nanos"].into_iter().collect();
        assert_eq!(mask.to_string(), "seconds,nanos");
        assert_eq!(mask.len(), 2);
    }
}
