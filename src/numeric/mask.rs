// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use super::{parse_path, FieldNumber};

/// A field selection expressed as dotted field-number paths.
///
/// Paths are held in a sorted set, so two masks with the same paths and
/// invert flag compare and hash equal regardless of insertion order.
///
/// Serialized with the protobuf JSON names:
///
/// ```
/// use numeric_field_mask::NumericFieldMask;
///
/// let mask: NumericFieldMask =
///     serde_json::from_str(r#"{"fieldNumberPath": ["2", "1.1"], "invertMask": true}"#).unwrap();
/// assert!(mask.is_inverted());
/// assert_eq!(mask.paths().collect::<Vec<_>>(), vec!["1.1", "2"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NumericFieldMask {
    #[serde(default, rename = "fieldNumberPath")]
    paths: BTreeSet<String>,
    #[serde(default, rename = "invertMask")]
    invert: bool,
}

impl NumericFieldMask {
    /// Empty, non-inverted mask (selects nothing).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inverted mask with no paths: selects every field.
    #[must_use]
    pub fn all_fields() -> Self {
        Self {
            paths: BTreeSet::new(),
            invert: true,
        }
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            invert: false,
        }
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.paths.insert(path.into());
        self
    }

    #[must_use]
    pub fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Returns `true` if the path was not already present.
    pub fn add_path(&mut self, path: impl Into<String>) -> bool {
        self.paths.insert(path.into())
    }

    pub fn set_invert(&mut self, invert: bool) {
        self.invert = invert;
    }

    #[must_use]
    pub fn is_inverted(&self) -> bool {
        self.invert
    }

    /// Paths in ascending string order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    #[must_use]
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// True iff the mask is inverted and lists no paths.
    #[must_use]
    pub fn is_all_fields(&self) -> bool {
        self.invert && self.paths.is_empty()
    }

    /// Copy without paths already covered by a listed ancestor
    /// (`"1.2"` is dropped when `"1"` is present).
    ///
    /// Ancestry is decided on field numbers, so `"04.1"` is covered by `"4"`.
    /// Paths that do not parse are kept for resolution to reject.
    #[must_use]
    pub fn without_covered_paths(&self) -> Self {
        let parsed: Vec<(&String, Option<Vec<FieldNumber>>)> = self
            .paths
            .iter()
            .map(|path| (path, parse_path(path).ok()))
            .collect();
        let listed: HashSet<&[FieldNumber]> = parsed
            .iter()
            .filter_map(|(_, numbers)| numbers.as_deref())
            .collect();

        let paths = parsed
            .iter()
            .filter(|(_, numbers)| {
                numbers.as_deref().map_or(true, |numbers| {
                    !(1..numbers.len()).any(|len| listed.contains(&numbers[..len]))
                })
            })
            .map(|(path, _)| (*path).clone())
            .collect();

        Self {
            paths,
            invert: self.invert,
        }
    }
}

/// True iff `mask` selects every field (inverted, no paths).
#[must_use]
pub fn is_all_fields(mask: &NumericFieldMask) -> bool {
    mask.is_all_fields()
}
