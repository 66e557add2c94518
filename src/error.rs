// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use thiserror::Error;

use crate::numeric::FieldNumber;

#[derive(Error, Debug)]
pub enum FieldMaskError {
    /// Path is not a dot-separated list of field numbers.
    #[error("malformed field number path '{path}': {reason}")]
    MalformedPath { path: String, reason: String },

    /// A segment names a field number the message type does not declare.
    #[error("unknown field number {field_number} on '{message_type}' in path '{path}'")]
    UnknownField {
        path: String,
        field_number: FieldNumber,
        message_type: String,
    },

    /// A non-terminal segment cannot be descended into.
    #[error("invalid field mask path '{path}': field '{field}' of '{message_type}' {reason}")]
    InvalidFieldMask {
        path: String,
        field: String,
        message_type: String,
        reason: String,
    },

    #[error("unknown message type '{name}'")]
    UnknownMessageType { name: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("schema definition parse failed: {0}")]
    Schema(#[from] serde_json::Error),
}

impl FieldMaskError {
    /// True for errors caused by a well-formed path that does not fit the schema.
    #[must_use]
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            Self::UnknownField { .. } | Self::InvalidFieldMask { .. }
        )
    }

    /// Short label used for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedPath { .. } => "malformed_path",
            Self::UnknownField { .. } => "unknown_field",
            Self::InvalidFieldMask { .. } => "invalid_field_mask",
            Self::UnknownMessageType { .. } => "unknown_message_type",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Schema(_) => "schema",
        }
    }
}

pub type Result<T> = std::result::Result<T, FieldMaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_classification() {
        let unknown = FieldMaskError::UnknownField {
            path: "3".into(),
            field_number: 3,
            message_type: "google.protobuf.Timestamp".into(),
        };
        let malformed = FieldMaskError::MalformedPath {
            path: "1.".into(),
            reason: "empty segment".into(),
        };

        assert!(unknown.is_schema_mismatch());
        assert!(!malformed.is_schema_mismatch());
        assert_eq!(malformed.kind(), "malformed_path");
    }

    #[test]
    fn test_error_display() {
        let err = FieldMaskError::UnknownField {
            path: "3".into(),
            field_number: 3,
            message_type: "google.protobuf.Timestamp".into(),
        };
        assert_eq!(
            err.to_string(),
            "unknown field number 3 on 'google.protobuf.Timestamp' in path '3'"
        );
    }
}
