// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Copy only the requested fields of a message.

use std::borrow::Cow;
use tracing::{instrument, trace};

use super::{FieldMaskResolver, NumericFieldMask};
use crate::error::Result;
use crate::field_mask::merge;
use crate::message::ReflectMessage;
use crate::schema::MessageSchema;

impl FieldMaskResolver {
    /// New message of the same type holding only the fields `mask` selects.
    ///
    /// An all-fields mask (inverted, no paths) returns `source` itself
    /// without copying. Otherwise the mask is resolved (through the cache)
    /// and merged from `source` into an empty message using this
    /// resolver's [`MergeOptions`](crate::MergeOptions).
    #[instrument(skip(self, source, mask), fields(paths = mask.path_count(), invert = mask.is_inverted()))]
    pub fn copy_requested_fields<'a, M: ReflectMessage>(
        &self,
        source: &'a M,
        mask: &NumericFieldMask,
    ) -> Result<Cow<'a, M>> {
        if mask.is_all_fields() {
            trace!("All fields requested, returning source");
            return Ok(Cow::Borrowed(source));
        }

        let schema = source.schema();
        let field_mask = self.to_field_mask(&schema, mask)?;

        let mut destination = source.new_for_type();
        merge(&field_mask, source, &mut destination, self.merge_options());

        trace!(message_type = schema.full_name(), selected = field_mask.len(), "Copied requested fields");
        Ok(Cow::Owned(destination))
    }
}
