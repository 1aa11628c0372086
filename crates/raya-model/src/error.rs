//! Model engine errors

use thiserror::Error;

/// Errors raised while declaring classes, building models, or accessing properties
#[derive(Debug, Error)]
pub enum ModelError {
    /// A write was attempted without a target instance or property
    #[error("Null target: {what}")]
    NullTarget {
        /// What was missing (instance, property, holder)
        what: String,
    },

    /// A value does not fit the declared property type
    #[error("Type mismatch on `{property}`: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Property name
        property: String,
        /// Declared type
        expected: String,
        /// Runtime value description
        actual: String,
    },

    /// The property has no usable setter
    #[error("Property `{name}` is read-only")]
    ReadOnly {
        /// Property name
        name: String,
    },

    /// Positional access outside a container
    #[error("Index {index} out of bounds (length {len})")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Container length
        len: usize,
    },

    /// Class id or name not present in the class table
    #[error("Unknown class: {name}")]
    UnknownClass {
        /// Class id or name
        name: String,
    },

    /// A class declaration is malformed
    #[error("Invalid declaration of `{class}`: {message}")]
    InvalidDeclaration {
        /// Class name
        class: String,
        /// Error message
        message: String,
    },

    /// The access policy forbids the operation
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Error message
        message: String,
    },

    /// An accessor failed while touching an instance
    #[error("Reflection failure: {message}")]
    Reflection {
        /// Error message
        message: String,
    },

    /// Configuration could not be applied
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Configuration file could not be read
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl ModelError {
    pub(crate) fn null_target(what: impl Into<String>) -> Self {
        Self::NullTarget { what: what.into() }
    }

    pub(crate) fn reflection(message: impl Into<String>) -> Self {
        Self::Reflection {
            message: message.into(),
        }
    }

    pub(crate) fn unknown_class(name: impl Into<String>) -> Self {
        Self::UnknownClass { name: name.into() }
    }
}

/// Result alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;
