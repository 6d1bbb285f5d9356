//! Prompt Adapters

pub mod queued_prompt;

pub use queued_prompt::QueuedPrompt;
