//! Queued Prompt - Pre-Answered Modal
//!
//! Answers each modal from a FIFO of prepared responses. A `None`
//! response, or an empty queue, behaves like the user dismissing the
//! modal. The shell fills the queue from the command line before a
//! roll; tests script it directly.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::ports::prompt::{ModifierPrompt, PromptDescriptor};

#[derive(Debug, Default)]
pub struct QueuedPrompt {
    answers: Mutex<VecDeque<Option<i32>>>,
}

impl QueuedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next modal.
    pub fn push(&self, answer: Option<i32>) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.push_back(answer);
        }
    }

    /// Drop any unused answers.
    pub fn clear(&self) {
        if let Ok(mut answers) = self.answers.lock() {
            answers.clear();
        }
    }
}

#[async_trait]
impl ModifierPrompt for QueuedPrompt {
    async fn open(&self, descriptor: &PromptDescriptor) -> Option<i32> {
        let answer = self
            .answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .flatten();
        debug!(title = %descriptor.title, ?answer, "Modal answered");
        answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_answers_in_order_then_dismisses() {
        let prompt = QueuedPrompt::new();
        prompt.push(Some(2));
        prompt.push(None);
        let descriptor = PromptDescriptor::modifier("Additional Modifier");
        assert_eq!(prompt.open(&descriptor).await, Some(2));
        assert_eq!(prompt.open(&descriptor).await, None);
        assert_eq!(prompt.open(&descriptor).await, None);
    }
}
