//! Sheet error taxonomy.
//!
//! Storage failures never appear here: the persistence coordinator
//! logs and swallows them, and the ports report them as `anyhow`.
//! Parse failures on numeric fields are coerced in place and never
//! surface here.

use thiserror::Error;

/// Errors produced by the sheet core.
#[derive(Debug, Error)]
pub enum SheetError {
    /// A caller passed an argument outside the operation's domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An imported snapshot could not be parsed.
    #[error("import failed: {0}")]
    ImportParse(String),

    /// The modal prompt was dismissed; the triggering action is abandoned.
    #[error("prompt cancelled")]
    PromptCancelled,
}

impl From<serde_json::Error> for SheetError {
    fn from(e: serde_json::Error) -> Self {
        Self::ImportParse(e.to_string())
    }
}
