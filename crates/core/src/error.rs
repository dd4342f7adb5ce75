//! Error model for the CloudEvents core.

use thiserror::Error;

/// Result type used across the core library.
pub type CoreResult<T> = Result<T, CoreError>;

/// A value-level failure, scoped to a single attribute type.
///
/// Produced by the attribute type system; callers that know which attribute
/// was involved wrap this in [`CoreError::Attribute`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The raw string is not a lexically valid instance of the type.
    #[error("`{value}` is not a valid {type_name}: {reason}")]
    Parse {
        type_name: &'static str,
        value: String,
        reason: String,
    },

    /// A typed value violates a shape/range constraint of its type.
    #[error("{0}")]
    Constraint(String),

    /// The value belongs to a different attribute type than the one asked
    /// to handle it.
    #[error("expected a {expected} value, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl ValueError {
    pub fn parse(
        type_name: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            type_name,
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }
}

/// Core-level error.
///
/// Argument/precondition failures surface immediately, before any shared
/// state is mutated; parse and validation failures name the offending
/// attribute so callers can diagnose without replaying the input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Parse or validation failure scoped to a named attribute.
    #[error("attribute `{name}`: {source}")]
    Attribute {
        name: String,
        #[source]
        source: ValueError,
    },

    /// An attribute name is syntactically invalid.
    #[error("invalid attribute name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    /// An attribute was referenced by a name nothing is registered under.
    #[error("unknown attribute `{0}` (no spec or extension descriptor registered)")]
    UnknownAttribute(String),

    /// `specversion` (or another reserved name) was used as an ordinary attribute.
    #[error("attribute `{0}` is reserved and cannot be set as a generic attribute")]
    Reserved(String),

    /// An extension descriptor collides with an existing attribute.
    #[error("extension attribute `{0}` collides with an existing attribute")]
    Collision(String),

    /// A required attribute is unset at the validation gate.
    #[error("`{param}` is not a valid CloudEvent: required attribute `{attribute}` is unset")]
    MissingAttribute {
        param: &'static str,
        attribute: String,
    },

    /// A content-type header value that does not parse as a media type.
    #[error("invalid content type `{value}`: {reason}")]
    InvalidContentType { value: String, reason: String },

    /// The caller insisted on a spec version outside the registered set.
    #[error("unknown CloudEvents spec version `{0}`")]
    UnknownSpecVersion(String),

    /// A required argument was absent.
    #[error("argument `{0}` must be provided")]
    MissingArgument(&'static str),
}

impl CoreError {
    /// Scope a value-level failure to the attribute it occurred on.
    pub fn attribute(name: impl Into<String>, source: ValueError) -> Self {
        Self::Attribute {
            name: name.into(),
            source,
        }
    }

    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        Self::UnknownAttribute(name.into())
    }

    pub fn collision(name: impl Into<String>) -> Self {
        Self::Collision(name.into())
    }
}

/// Failure while encoding or decoding a wire representation.
///
/// Raised by [`EventFormatter`](crate::formatter::EventFormatter)
/// implementations; core failures pass through unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The body does not match the structure the format requires.
    #[error("malformed {format} message: {reason}")]
    Malformed {
        format: &'static str,
        reason: String,
    },

    /// The declared content type is outside what this formatter handles.
    #[error("content type `{0}` is not supported by this formatter")]
    UnsupportedContentType(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FormatError {
    pub fn malformed(format: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            format,
            reason: reason.into(),
        }
    }

    pub fn unsupported_content_type(content_type: impl Into<String>) -> Self {
        Self::UnsupportedContentType(content_type.into())
    }
}
