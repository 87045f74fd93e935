//! Error types for the object model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while building or introspecting models.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// The model declares no identity property.
    #[error("model {model} has no identity property")]
    MissingIdentity {
        /// The model type name.
        model: String,
    },

    /// The model declares more than one identity property.
    #[error("model {model} declares duplicate identity properties: {first}, {second}")]
    DuplicateIdentity {
        /// The model type name.
        model: String,
        /// The first identity property encountered.
        first: String,
        /// The conflicting identity property.
        second: String,
    },

    /// A list or map property nests a value that cannot be flattened.
    #[error("property {property} of model {model} nests a non-scalar value")]
    UnsupportedNesting {
        /// The model type name.
        model: String,
        /// The offending property.
        property: String,
    },

    /// A reference string did not match the `<context>/<identity>` shape.
    #[error("malformed reference: {raw}")]
    MalformedReference {
        /// The raw reference string.
        raw: String,
    },

    /// Schema assembly failed while deriving columns.
    #[error(transparent)]
    Schema(#[from] revtab_schema::SchemaError),
}

impl ModelError {
    /// Creates a missing identity error.
    pub fn missing_identity(model: impl Into<String>) -> Self {
        Self::MissingIdentity {
            model: model.into(),
        }
    }

    /// Creates a duplicate identity error.
    pub fn duplicate_identity(
        model: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        Self::DuplicateIdentity {
            model: model.into(),
            first: first.into(),
            second: second.into(),
        }
    }

    /// Creates an unsupported nesting error.
    pub fn unsupported_nesting(model: impl Into<String>, property: impl Into<String>) -> Self {
        Self::UnsupportedNesting {
            model: model.into(),
            property: property.into(),
        }
    }

    /// Creates a malformed reference error.
    pub fn malformed_reference(raw: impl Into<String>) -> Self {
        Self::MalformedReference { raw: raw.into() }
    }
}
