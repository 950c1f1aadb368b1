//! Completion gate: at most one reward grant per exercise instance.

use serde::Serialize;
use tokio::sync::OnceCell;

use crate::{error::RewardError, reward::RewardLedger};

/// What completing an exercise produced. Both variants move the learner forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Completion {
    /// The reward was granted by this completion
    Granted { points: u32 },
    /// The reward had been granted before
    AlreadyCompleted,
}

impl Completion {
    pub const fn newly_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }

    /// Points to show in the feedback, zero when already completed.
    pub const fn points(&self) -> u32 {
        match self {
            Self::Granted { points } => *points,
            Self::AlreadyCompleted => 0,
        }
    }
}

/// Calls the ledger once and replays its answer to every later caller.
///
/// Concurrent callers wait for the first grant instead of issuing their own. A
/// failed grant leaves the gate open.
#[derive(Debug, Default)]
pub struct CompletionGate {
    outcome: OnceCell<Completion>,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn complete<L>(
        &self,
        ledger: &L,
        reward_key: &str,
        points: u32,
    ) -> Result<Completion, RewardError>
    where
        L: RewardLedger,
    {
        let completion = self
            .outcome
            .get_or_try_init(|| async {
                let newly_granted = ledger.grant(reward_key, points).await?;
                if newly_granted {
                    tracing::info!(reward_key, points, "Reward granted");
                    Ok(Completion::Granted { points })
                } else {
                    tracing::info!(reward_key, "Reward already granted, skipping");
                    Ok(Completion::AlreadyCompleted)
                }
            })
            .await?;

        Ok(*completion)
    }

    /// Outcome of the completed grant, if any.
    pub fn outcome(&self) -> Option<Completion> {
        self.outcome.get().copied()
    }
}
