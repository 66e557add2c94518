// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Numeric mask -> name-based [`FieldMask`] resolution.

use tracing::{debug, instrument};

use super::{
    build_nested_path, resolve_path, MaskCache, MaskCacheStats, MaskTree, NumericFieldMask,
};
use crate::config::FieldMaskConfig;
use crate::error::Result;
use crate::field_mask::{FieldMask, MergeOptions};
use crate::metrics::{self, ResolveTimer};
use crate::schema::MessageSchema;

/// Mask selecting every field of `schema` not selected by `mask`.
///
/// The invert flag of `mask` is ignored; the result is never inverted.
///
/// With no paths the result lists the direct fields of `schema`. Otherwise
/// the mask's paths become a [`MaskTree`], the schema is mirrored to the
/// same depth, and the difference is collapsed so untouched fields come
/// out as a single path.
pub fn invert_mask<S: MessageSchema>(schema: &S, mask: &NumericFieldMask) -> Result<NumericFieldMask> {
    if mask.path_count() == 0 {
        return Ok(NumericFieldMask::from_paths(
            schema.fields().iter().map(|field| build_nested_path(&[field.number])),
        ));
    }

    let mask_tree = MaskTree::from_mask(&mask.without_covered_paths())?;
    let depth = mask_tree.max_depth();
    let schema_tree = MaskTree::from_schema(schema, depth);

    let inverted = schema_tree
        .subtract(&mask_tree)
        .collapse_complete(&schema_tree);

    debug!(
        message_type = schema.full_name(),
        depth,
        excluded = mask.path_count(),
        remaining = inverted.node_count(),
        "Inverted numeric mask"
    );

    Ok(inverted.to_mask())
}

/// Resolve `mask` against `schema` without caching.
///
/// Every explicit path is resolved first, so an inverted mask naming a
/// missing field fails the same way a plain one does.
pub fn resolve_field_mask<S: MessageSchema>(schema: &S, mask: &NumericFieldMask) -> Result<FieldMask> {
    let explicit = resolve_all(schema, mask)?;

    let names = if mask.is_inverted() {
        resolve_all(schema, &invert_mask(schema, mask)?)?
    } else {
        explicit
    };

    Ok(FieldMask::from_paths(names).normalize())
}

fn resolve_all<S: MessageSchema>(schema: &S, mask: &NumericFieldMask) -> Result<Vec<String>> {
    mask.paths().map(|path| resolve_path(schema, path)).collect()
}

/// Caching front end for mask resolution and field copying.
///
/// Owns its [`MaskCache`], keyed by message type *name*. Construct one per
/// schema registry lifetime, or clear the cache after re-registering a type.
///
/// ```
/// use numeric_field_mask::{FieldMaskResolver, NumericFieldMask, SchemaRegistry};
///
/// let registry = SchemaRegistry::with_well_known_types();
/// let timestamp = registry.descriptor("google.protobuf.Timestamp").unwrap();
/// let resolver = FieldMaskResolver::new();
///
/// let mask = NumericFieldMask::from_paths(["2"]).with_invert(true);
/// let resolved = resolver.to_field_mask(&timestamp, &mask).unwrap();
/// assert_eq!(resolved.paths(), ["seconds"]);
/// ```
#[derive(Debug)]
pub struct FieldMaskResolver {
    cache: MaskCache,
    merge_options: MergeOptions,
}

impl Default for FieldMaskResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMaskResolver {
    /// Resolver with an unbounded cache that replaces fields wholesale when copying.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: MaskCache::default(),
            merge_options: MergeOptions::replace_all(),
        }
    }

    pub fn from_config(config: &FieldMaskConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cache: MaskCache::new(config.eviction_policy()),
            merge_options: config.merge_options(),
        })
    }

    #[must_use]
    pub fn with_cache(mut self, cache: MaskCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_merge_options(mut self, merge_options: MergeOptions) -> Self {
        self.merge_options = merge_options;
        self
    }

    #[must_use]
    pub fn cache(&self) -> &MaskCache {
        &self.cache
    }

    #[must_use]
    pub fn cache_stats(&self) -> MaskCacheStats {
        self.cache.stats()
    }

    #[must_use]
    pub fn merge_options(&self) -> &MergeOptions {
        &self.merge_options
    }

    /// Resolve `mask` to a normalized name-based mask, cached per
    /// (message type, mask).
    #[instrument(
        skip(self, schema, mask),
        fields(message_type = schema.full_name(), paths = mask.path_count(), invert = mask.is_inverted())
    )]
    pub fn to_field_mask<S: MessageSchema>(&self, schema: &S, mask: &NumericFieldMask) -> Result<FieldMask> {
        self.cache.get_or_try_insert_with(schema.full_name(), mask, || {
            let _timer = ResolveTimer::new();
            resolve_field_mask(schema, mask).inspect_err(|e| {
                metrics::record_resolve_error(e.kind());
            })
        })
    }

    /// Whether `mask` resolves against `schema` to a valid field mask.
    ///
    /// Unknown fields, paths through non-message fields, and resolved masks
    /// rejected by [`FieldMask::is_valid`] give `Ok(false)`. Syntax errors
    /// are not a validity question and are returned as `Err(MalformedPath)`.
    pub fn is_valid<S: MessageSchema>(&self, schema: &S, mask: &NumericFieldMask) -> Result<bool> {
        match self.to_field_mask(schema, mask) {
            Ok(field_mask) => Ok(field_mask.is_valid(schema)),
            Err(e) if e.is_schema_mismatch() => {
                debug!(error = %e, "Numeric mask does not fit schema");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldMaskError;
    use crate::schema::{FieldType, MessageDescriptor, MessageType, SchemaRegistry};

    fn descriptor(name: &str) -> MessageDescriptor {
        SchemaRegistry::with_well_known_types().descriptor(name).unwrap()
    }

    fn resolved(schema: &MessageDescriptor, mask: &NumericFieldMask) -> Vec<String> {
        resolve_field_mask(schema, mask).unwrap().paths().to_vec()
    }

    #[test]
    fn test_timestamp_single_level() {
        let ts = descriptor("google.protobuf.Timestamp");

        assert_eq!(resolved(&ts, &NumericFieldMask::all_fields()), vec!["nanos", "seconds"]);
        assert_eq!(
            resolved(&ts, &NumericFieldMask::from_paths(["2"]).with_invert(true)),
            vec!["seconds"]
        );
        assert_eq!(resolved(&ts, &NumericFieldMask::from_paths(["2"])), vec!["nanos"]);
    }

    #[test]
    fn test_nested_path() {
        let ty = descriptor("google.protobuf.Type");
        assert_eq!(
            resolved(&ty, &NumericFieldMask::from_paths(["5.1"])),
            vec!["source_context.file_name"]
        );
    }

    #[test]
    fn test_nested_inverted_removes_parent() {
        let ty = descriptor("google.protobuf.Type");
        let mask = NumericFieldMask::from_paths(["5.1", "4.1", "4.2"]).with_invert(true);

        assert_eq!(
            resolved(&ty, &mask),
            vec!["edition", "fields", "name", "oneofs", "syntax"]
        );
    }

    #[test]
    fn test_nested_inverted_keeps_sibling() {
        let ty = descriptor("google.protobuf.Type");
        let paths = resolved(&ty, &NumericFieldMask::from_paths(["4.1"]).with_invert(true));

        assert!(paths.contains(&"options.value".to_string()));
        assert!(!paths.contains(&"options.name".to_string()));
        assert!(!paths.contains(&"options".to_string()));
        for sibling in ["name", "fields", "oneofs", "source_context", "syntax", "edition"] {
            assert!(paths.contains(&sibling.to_string()), "missing {sibling}");
        }
    }

    #[test]
    fn test_inverted_with_covered_paths() {
        let ty = descriptor("google.protobuf.Type");
        let mask = NumericFieldMask::from_paths(["4", "4.1"]).with_invert(true);

        let paths = resolved(&ty, &mask);
        assert!(!paths.iter().any(|p| p.starts_with("options")));
        assert_eq!(paths.len(), 6);
    }

    #[test]
    fn test_inverted_with_leading_zero_covered_path() {
        let ty = descriptor("google.protobuf.Type");

        assert_eq!(resolved(&ty, &NumericFieldMask::from_paths(["4", "04.1"])), vec!["options"]);

        let paths = resolved(&ty, &NumericFieldMask::from_paths(["4", "04.1"]).with_invert(true));
        assert!(!paths.iter().any(|p| p.starts_with("options")), "{paths:?}");
        assert_eq!(paths.len(), 6);
    }

    #[test]
    fn test_invert_mask_empty_lists_direct_fields() {
        let ty = descriptor("google.protobuf.Type");
        let inverted = invert_mask(&ty, &NumericFieldMask::all_fields()).unwrap();

        assert_eq!(inverted.paths().collect::<Vec<_>>(), vec!["1", "2", "3", "4", "5", "6", "7"]);
        assert!(!inverted.is_inverted());
    }

    #[test]
    fn test_invert_everything_yields_empty() {
        let ts = descriptor("google.protobuf.Timestamp");
        let mask = NumericFieldMask::from_paths(["1", "2"]).with_invert(true);
        assert!(resolve_field_mask(&ts, &mask).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_field_numbers() {
        let ts = descriptor("google.protobuf.Timestamp");
        let ty = descriptor("google.protobuf.Type");

        assert!(matches!(
            resolve_field_mask(&ts, &NumericFieldMask::from_paths(["3"])),
            Err(FieldMaskError::UnknownField { .. })
        ));
        assert!(matches!(
            resolve_field_mask(&ty, &NumericFieldMask::from_paths(["3.13"])),
            Err(FieldMaskError::InvalidFieldMask { .. })
        ));
        // Inverted masks are checked too
        assert!(matches!(
            resolve_field_mask(&ts, &NumericFieldMask::from_paths(["3"]).with_invert(true)),
            Err(FieldMaskError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_invalid_syntax() {
        let ts = descriptor("google.protobuf.Timestamp");
        for path in ["seconds", "nanos", "seconds.nanos", "1.", "1.."] {
            assert!(
                matches!(
                    resolve_field_mask(&ts, &NumericFieldMask::from_paths([path])),
                    Err(FieldMaskError::MalformedPath { .. })
                ),
                "expected '{path}' to be malformed"
            );
        }
    }

    #[test]
    fn test_resolver_caches() {
        let ts = descriptor("google.protobuf.Timestamp");
        let resolver = FieldMaskResolver::new();

        let first = resolver
            .to_field_mask(&ts, &NumericFieldMask::from_paths(["2", "1"]))
            .unwrap();
        let second = resolver
            .to_field_mask(&ts, &NumericFieldMask::new().with_path("1").with_path("2"))
            .unwrap();

        assert_eq!(first, second);
        let stats = resolver.cache_stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[test]
    fn test_reregistered_type_needs_cache_clear() {
        let registry = SchemaRegistry::new();
        registry.register(MessageType::new("demo.Thing").field(1, "old_name", FieldType::String));
        let resolver = FieldMaskResolver::new();
        let mask = NumericFieldMask::from_paths(["1"]);

        let before = registry.descriptor("demo.Thing").unwrap();
        assert_eq!(resolver.to_field_mask(&before, &mask).unwrap().paths(), ["old_name"]);

        registry.register(MessageType::new("demo.Thing").field(1, "new_name", FieldType::String));
        let after = registry.descriptor("demo.Thing").unwrap();

        // Same name, same cache slot
        assert_eq!(before, after);
        assert_eq!(resolver.to_field_mask(&after, &mask).unwrap().paths(), ["old_name"]);

        resolver.cache().clear();
        assert_eq!(resolver.to_field_mask(&after, &mask).unwrap().paths(), ["new_name"]);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let ts = descriptor("google.protobuf.Timestamp");
        let resolver = FieldMaskResolver::new();
        let mask = NumericFieldMask::from_paths(["9"]);

        assert!(resolver.to_field_mask(&ts, &mask).is_err());
        assert!(resolver.to_field_mask(&ts, &mask).is_err());
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_is_valid_policy() {
        let ty = descriptor("google.protobuf.Type");
        let resolver = FieldMaskResolver::new();

        assert!(resolver.is_valid(&ty, &NumericFieldMask::from_paths(["5.1"])).unwrap());
        assert!(!resolver.is_valid(&ty, &NumericFieldMask::from_paths(["9"])).unwrap());
        assert!(!resolver.is_valid(&ty, &NumericFieldMask::from_paths(["1.1"])).unwrap());
        // Resolves, but options is repeated and cannot be descended into
        assert!(!resolver.is_valid(&ty, &NumericFieldMask::from_paths(["4.1"])).unwrap());
        assert!(matches!(
            resolver.is_valid(&ty, &NumericFieldMask::from_paths(["1."])),
            Err(FieldMaskError::MalformedPath { .. })
        ));
    }
}
