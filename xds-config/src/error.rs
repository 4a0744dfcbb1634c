//! Error types for xDS resource and config-source handling.

use thiserror::Error;

/// A boxed error used as the source of decode failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for xDS resource and config-source handling.
#[derive(Debug, Error)]
pub enum Error {
    /// A resource entry declared a different type than the one requested.
    #[error("resource {index} has type_url {actual:?}, expected {expected:?}")]
    TypeMismatch {
        /// Position of the offending entry in the response.
        index: usize,
        /// The type URL that was requested.
        expected: String,
        /// The type URL the entry carried.
        actual: String,
    },

    /// A resource payload could not be parsed as its declared type.
    #[error("failed to decode resource of type {type_url:?}: {source}")]
    Decode {
        /// The type URL the payload was decoded as.
        type_url: String,
        /// The underlying parse error.
        #[source]
        source: BoxError,
    },

    /// A required field is absent from a configuration descriptor.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Fully qualified field name, e.g. `ApiConfigSource.refresh_delay`.
        field: &'static str,
    },

    /// A field carries a value that cannot be represented.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidField {
        /// Fully qualified field name.
        field: &'static str,
        /// What was wrong with the value.
        reason: String,
    },

    /// No decoder is registered for a type URL.
    #[error("no decoder registered for type_url {0:?}")]
    UnknownType(String),

    /// A descriptor failed a consistency check.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl Error {
    /// Builds a [`Error::Decode`] for the given type URL.
    pub fn decode(type_url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            type_url: type_url.into(),
            source: source.into(),
        }
    }
}

/// Result type alias for xDS config operations.
pub type Result<T> = std::result::Result<T, Error>;
