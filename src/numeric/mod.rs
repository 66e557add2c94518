// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Numeric field masks.
//!
//! # Design
//!
//! A numeric mask selects fields by number relative to a root message type:
//!
//! ```text
//! google.protobuf.Type
//! ├── 1 name
//! ├── 4 options ─────────── google.protobuf.Option
//! │                         ├── 1 name
//! │                         └── 2 value
//! └── 5 source_context ──── google.protobuf.SourceContext
//!                           └── 1 file_name
//!
//! "5.1"  ──resolve──▶  "source_context.file_name"
//! ```
//!
//! Inverted masks ("everything except ...") are realized as a tree
//! difference: the mask's paths become a [`MaskTree`], the schema is
//! mirrored into a second tree bounded by the mask's depth, and the
//! difference is turned back into numeric paths before resolution.
//!
//! # Flow
//!
//! ```text
//! NumericFieldMask
//!       │
//!       ▼
//! MaskCache lookup ── hit ──▶ FieldMask
//!       │ miss
//!       ▼
//! invert (tree difference, if requested)
//!       │
//!       ▼
//! resolve numbers → names, normalize ──▶ cache store ──▶ FieldMask
//! ```

mod cache;
mod copier;
mod mask;
mod path;
mod resolver;
mod tree;

pub use cache::{EvictionPolicy, MaskCache, MaskCacheStats};
pub use mask::{is_all_fields, NumericFieldMask};
pub use path::{build_nested_path, join_names, parse_path, resolve_numbers, resolve_path, PATH_SEPARATOR};
pub use resolver::{invert_mask, resolve_field_mask, FieldMaskResolver};
pub use tree::{MaskNode, MaskTree, ROOT_VALUE};

/// Field number as declared in a message schema.
pub type FieldNumber = i32;
