//! Error types for dewrap

use thiserror::Error;

/// dewrap error types
#[derive(Debug, Error)]
pub enum DewrapError {
    /// The top-level result of an unwrap was not a keyed mapping.
    #[error(
        "Shape mismatch: result is not a plain keyed mapping (found {found}).\n\
         \n\
         Record-level unwrapping expects a mapping, or a wrapper around one,\n\
         at the top level. Select a nested record with --pointer if needed."
    )]
    ShapeMismatch {
        /// Type name of the value the traversal produced
        found: String,
    },

    /// Plain output was requested for a value that still holds a wrapper.
    #[error("Value is not plain: wrapper found at '{path}'")]
    NotPlain {
        /// JSON Pointer to the first wrapper encountered
        path: String,
    },

    /// An envelope object on the wire was malformed.
    #[error("Invalid envelope: {reason}")]
    InvalidEnvelope {
        /// Explanation of what was wrong with the envelope
        reason: String,
    },

    /// Pointer string too long
    #[error(
        "Pointer too long: {length} characters (max: {max_length}).\n\
         \n\
         This limit prevents malicious inputs. If you have a legitimate use case,\n\
         raise max_pointer_length in the configuration file."
    )]
    PointerTooLong {
        /// Actual length of the pointer string (characters)
        length: usize,
        /// Maximum pointer length allowed (characters)
        max_length: usize,
    },

    /// Pointer depth limit exceeded
    #[error("Pointer depth limit exceeded: '{pointer}' has depth {depth} (max: {max_depth})")]
    PointerDepthExceeded {
        /// JSON Pointer path being processed
        pointer: String,
        /// Actual depth of the pointer
        depth: usize,
        /// Maximum depth allowed
        max_depth: usize,
    },

    /// Invalid pointer syntax
    #[error(
        "Invalid JSON Pointer syntax: '{pointer}' - {reason}\n\
         \n\
         JSON Pointers must:\n\
         - Start with '/' (or be empty string for root)\n\
         - Use '~0' to escape '~' and '~1' to escape '/'\n\
         \n\
         See RFC 6901 for details."
    )]
    InvalidPointer {
        /// The invalid pointer string
        pointer: String,
        /// Explanation of why the pointer is invalid
        reason: String,
    },

    /// Pointer path not found in document
    #[error(
        "Pointer not found: '{pointer}' does not exist.\n\
         \n\
         Reached: '{reached}'\n\
         Available keys at this level: {available}"
    )]
    PointerNotFound {
        /// JSON Pointer path that was not found
        pointer: String,
        /// Path navigated before failure
        reached: String,
        /// Description of what was available at the failure point
        available: String,
    },

    /// A configured limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    /// Configuration exceeds hard limits
    #[error("Configuration exceeds hard limits: {reason}")]
    ConfigurationExceedsHardLimits {
        /// Description of which limit was exceeded
        reason: String,
    },

    /// The requested output format cannot represent the produced records.
    #[error("Output shape error: {0}")]
    OutputShape(String),

    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal invariant was violated.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DewrapError {
    /// True for per-record errors that `skip_invalid` may skip over
    pub fn is_record_level(&self) -> bool {
        matches!(self, DewrapError::ShapeMismatch { .. })
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, DewrapError>;
