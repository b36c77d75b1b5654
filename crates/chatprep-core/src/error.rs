//! Error types for chatprep.

use thiserror::Error;

/// Result type alias for chatprep operations.
pub type Result<T> = std::result::Result<T, ChatPrepError>;

/// Main error type for chatprep operations.
#[derive(Error, Debug)]
pub enum ChatPrepError {
    /// No configuration registered under the requested name.
    #[error("Unknown model configuration: {0}")]
    UnknownModel(String),

    /// A role appeared in a conversation without an entry in the
    /// configuration's prefix table.
    #[error("Role '{0}' missing from prefix table")]
    UnknownRole(String),

    /// A computed prefix or group function was handed a role it does not
    /// support.
    #[error("Role '{0}' not supported by this configuration")]
    UnsupportedRole(String),

    /// A turn without a value appeared before the end of the conversation.
    /// Only the final turn may omit its value (completion request).
    #[error("Turn {index} of {total} has no value; only the final turn may omit it")]
    CompletionNotLast {
        /// Zero-based index of the offending turn.
        index: usize,
        /// Number of turns in the conversation.
        total: usize,
    },

    /// Tokenizer errors.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed dataset records.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}
