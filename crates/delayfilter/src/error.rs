//! Error types for state persistence.
//!
//! The processing path has no error type: every out-of-range value is
//! clamped or wrapped where it is consumed.

use thiserror::Error;

/// Errors that can occur while saving or restoring a parameter blob.
#[derive(Debug, Error)]
pub enum StateError {
    /// The blob is not valid JSON (truncated, corrupt, wrong encoding)
    #[error("failed to parse state: {0}")]
    Parse(#[source] serde_json::Error),

    /// The blob parsed but its root is not a JSON object
    #[error("state root is not a JSON object")]
    NotAnObject,

    /// The root `type` tag names something other than a parameter tree
    #[error("state has type '{found}', expected 'Parameters'")]
    WrongType {
        /// The tag found in the blob, or `"<missing>"`.
        found: String,
    },

    /// The root object has no `params` object
    #[error("state has no 'params' object")]
    MissingParams,

    /// Serialization failed
    #[error("failed to serialize state: {0}")]
    Serialize(#[source] serde_json::Error),
}
