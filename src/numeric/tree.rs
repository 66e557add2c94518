// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Field-number tree for mask inversion.
//!
//! Paths sharing a prefix share ancestor nodes:
//!
//! ```text
//! ["1.1", "2.2", "3.3.1"]
//!
//! (root)
//! ├── 1
//! │   └── 1
//! ├── 2
//! │   └── 2
//! └── 3
//!     └── 3
//!         └── 1
//! ```
//!
//! Children are keyed by field number, so they are unique per parent and
//! always iterate in ascending order. Trees are built once and then only
//! read; [`MaskTree::subtract`] always produces a fresh tree.

use std::collections::BTreeMap;
use tracing::trace;

use super::{build_nested_path, parse_path, FieldNumber, NumericFieldMask};
use crate::error::Result;
use crate::schema::MessageSchema;

/// Value carried by the root node; never a real field number.
pub const ROOT_VALUE: FieldNumber = -1;

/// A node in a [`MaskTree`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaskNode {
    value: FieldNumber,
    /// Child field number -> child node (empty for leaves)
    children: BTreeMap<FieldNumber, MaskNode>,
}

impl MaskNode {
    #[must_use]
    pub fn new(value: FieldNumber) -> Self {
        Self {
            value,
            children: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn value(&self) -> FieldNumber {
        self.value
    }

    /// Children in ascending field-number order.
    pub fn children(&self) -> impl Iterator<Item = &MaskNode> {
        self.children.values()
    }

    #[must_use]
    pub fn child(&self, value: FieldNumber) -> Option<&MaskNode> {
        self.children.get(&value)
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Insert a path below this node, reusing existing nodes for shared prefixes.
    pub fn insert_path(&mut self, path: &[FieldNumber]) {
        let Some((&first, rest)) = path.split_first() else {
            return;
        };
        self.children
            .entry(first)
            .or_insert_with(|| MaskNode::new(first))
            .insert_path(rest);
    }

    fn add_child(&mut self, child: MaskNode) {
        self.children.insert(child.value, child);
    }

    fn max_depth(&self, current: usize) -> usize {
        self.children
            .values()
            .map(|child| child.max_depth(current + 1))
            .max()
            .unwrap_or(current)
    }

    fn node_count(&self) -> usize {
        1 + self.children.values().map(MaskNode::node_count).sum::<usize>()
    }

    /// Everything below `self` that `exclude` does not cover.
    ///
    /// - child absent from `exclude`: copied with its whole subtree
    /// - child present as a leaf in `exclude`, or with an identical subtree:
    ///   dropped
    /// - otherwise: recursed into; dropped if nothing remains below it
    fn subtract(&self, exclude: &MaskNode) -> MaskNode {
        let mut result = MaskNode::new(self.value);

        for child in self.children.values() {
            match exclude.child(child.value) {
                None => result.add_child(child.clone()),
                Some(excluded) if excluded.is_leaf() || excluded == child => {
                    trace!(field = child.value, "Subtree fully excluded");
                }
                Some(excluded) => {
                    let remainder = child.subtract(excluded);
                    if !remainder.is_leaf() {
                        result.add_child(remainder);
                    }
                }
            }
        }

        result
    }

    /// Replace every subtree identical to its counterpart in `full` with a
    /// single leaf.
    fn collapse_complete(&self, full: &MaskNode) -> MaskNode {
        let mut result = MaskNode::new(self.value);

        for child in self.children.values() {
            let collapsed = match full.child(child.value) {
                Some(complete) if complete == child => MaskNode::new(child.value),
                Some(complete) => child.collapse_complete(complete),
                None => child.clone(),
            };
            result.add_child(collapsed);
        }

        result
    }

    fn collect_paths(&self, prefix: &mut Vec<FieldNumber>, out: &mut Vec<String>) {
        prefix.push(self.value);
        if self.is_leaf() {
            out.push(build_nested_path(prefix));
        } else {
            for child in self.children.values() {
                child.collect_paths(prefix, out);
            }
        }
        prefix.pop();
    }

    fn add_schema_fields<S: MessageSchema>(&mut self, schema: &S, remaining_depth: usize) {
        if remaining_depth == 0 {
            return;
        }
        for field in schema.fields() {
            let mut node = MaskNode::new(field.number);
            if let Some(nested) = &field.message_type {
                node.add_schema_fields(nested, remaining_depth - 1);
            }
            self.add_child(node);
        }
    }
}

/// Ordered tree of field numbers under a sentinel root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaskTree {
    root: MaskNode,
}

impl Default for MaskTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MaskTree {
    /// Empty tree (root only).
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: MaskNode::new(ROOT_VALUE),
        }
    }

    /// Tree holding every path of `mask` (the invert flag is ignored).
    pub fn from_mask(mask: &NumericFieldMask) -> Result<Self> {
        let mut tree = Self::new();
        for path in mask.paths() {
            tree.insert_path(&parse_path(path)?);
        }
        Ok(tree)
    }

    /// Mirror of `schema` down to `max_depth` levels below the root.
    ///
    /// Message fields are expanded while depth remains; at the last level
    /// every field is a leaf. `max_depth == 0` yields an empty tree.
    #[must_use]
    pub fn from_schema<S: MessageSchema>(schema: &S, max_depth: usize) -> Self {
        let mut tree = Self::new();
        tree.root.add_schema_fields(schema, max_depth);
        tree
    }

    pub fn insert_path(&mut self, path: &[FieldNumber]) {
        self.root.insert_path(path);
    }

    #[must_use]
    pub fn root(&self) -> &MaskNode {
        &self.root
    }

    /// Number of levels below the root (0 for an empty tree).
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.root.max_depth(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf()
    }

    /// Number of nodes excluding the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.node_count() - 1
    }

    /// Paths of `self` not covered by `exclude`, as a new tree.
    #[must_use]
    pub fn subtract(&self, exclude: &MaskTree) -> MaskTree {
        MaskTree {
            root: self.root.subtract(&exclude.root),
        }
    }

    /// Collapse subtrees that equal their counterpart in `full` into leaves,
    /// so fully selected fields serialize as one path.
    #[must_use]
    pub fn collapse_complete(&self, full: &MaskTree) -> MaskTree {
        MaskTree {
            root: self.root.collapse_complete(&full.root),
        }
    }

    /// One numeric path per leaf, depth-first in ascending field order.
    #[must_use]
    pub fn to_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        for child in self.root.children.values() {
            child.collect_paths(&mut prefix, &mut out);
        }
        out
    }

    /// Non-inverted mask holding [`to_paths`](Self::to_paths).
    #[must_use]
    pub fn to_mask(&self) -> NumericFieldMask {
        NumericFieldMask::from_paths(self.to_paths())
    }
}
