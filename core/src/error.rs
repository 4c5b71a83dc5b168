//! Error types for schema compilation and instantiation

use thiserror::Error;

/// Main error type for schema operations
///
/// Classification predicates never produce one of these; only compiling a
/// schema document and building instances from JSON data can fail.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Schema document could not be parsed
    #[error("Failed to parse schema: {message}")]
    ParseError {
        /// Error message
        message: String,
        /// Location in the document if available
        location: Option<String>,
    },

    /// Document has no definitions section
    #[error("Schema has no definitions section (looked for {searched})")]
    MissingDefinitions {
        /// Keys that were searched, comma separated
        searched: String,
    },

    /// A named definition is not a JSON object
    #[error("Definition '{name}' is invalid: {reason}")]
    InvalidDefinition {
        /// Definition name
        name: String,
        /// Reason for rejection
        reason: String,
    },

    /// A local `$ref` points at nothing in the document
    #[error("Unresolved reference '{reference}' at {location}")]
    UnresolvedReference {
        /// The `$ref` string
        reference: String,
        /// JSON pointer of the fragment holding the reference
        location: String,
    },

    /// Class name not present in the registry
    #[error("Unknown schema class: {0}")]
    UnknownClass(String),

    /// Required property missing from instance data
    #[error("Missing required property '{property}' for class '{class}'")]
    MissingProperty {
        /// Class being instantiated
        class: String,
        /// Property that was absent
        property: String,
    },

    /// Instance data does not fit the class shape
    #[error("Invalid instance of '{class}': {message}")]
    InvalidInstance {
        /// Class being instantiated
        class: String,
        /// Error message
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

impl SchemaError {
    /// Create a new parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: None,
        }
    }

    /// Create a new parse error with location
    #[must_use]
    pub fn parse_at(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
            location: Some(location.into()),
        }
    }

    /// Create a new invalid definition error
    #[must_use]
    pub fn invalid_definition(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new invalid instance error
    #[must_use]
    pub fn invalid_instance(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInstance {
            class: class.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            location: Some(format!("line {}, column {}", err.line(), err.column())),
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SchemaError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
