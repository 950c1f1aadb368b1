use thiserror::Error;

/// Failures of the reward ledger collaborator.
#[derive(Error, Debug)]
pub enum RewardError {
    #[error("Reward ledger unavailable: {0}")]
    Unavailable(String),
    #[error("Reward rejected: {0}")]
    Rejected(String),
}
