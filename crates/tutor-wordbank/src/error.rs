use thiserror::Error;

/// Errors raised by word bank generation and answer validation.
///
/// None of them is fatal: every variant is recoverable inside the exercise.
#[derive(Error, Debug)]
pub enum WordBankError {
    #[error("Incomplete submission: expected {expected} selections, got {actual}")]
    IncompleteSubmission { expected: usize, actual: usize },
    #[error("Unknown display key: {0}")]
    UnknownDisplayKey(String),
    #[error("Tile selected more than once: {0}")]
    DuplicateSelection(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Environment error: {0}")]
    Env(#[from] envy::Error),
    #[error("Failed to serialize content key: {0}")]
    ContentKey(#[from] serde_json::Error),
}

impl WordBankError {
    /// Whether the error is the "not ready" signal of a partial submission,
    /// which must neither advance nor penalize the learner.
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, Self::IncompleteSubmission { .. })
    }
}
