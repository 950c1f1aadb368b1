//! Reward ledger collaborator.

use std::{collections::HashMap, future::Future};

use tokio::sync::Mutex;

use crate::error::RewardError;

/// Grants experience points for completed exercises.
///
/// `grant` resolves to `true` when the reward is newly granted and to `false`
/// when it was granted before (for example after navigating back to a completed
/// exercise). `false` is a regular outcome, not an error.
pub trait RewardLedger: Send + Sync {
    fn grant(
        &self,
        reward_key: &str,
        points: u32,
    ) -> impl Future<Output = Result<bool, RewardError>> + Send;
}

/// Ledger kept in memory, keyed by reward key.
#[derive(Debug, Default)]
pub struct InMemoryRewardLedger {
    granted: Mutex<HashMap<String, u32>>,
}

impl InMemoryRewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points granted so far, all exercises combined.
    pub async fn total_points(&self) -> u64 {
        self.granted
            .lock()
            .await
            .values()
            .map(|&points| u64::from(points))
            .sum()
    }

    /// Whether a reward was granted for `reward_key`.
    pub async fn is_granted(&self, reward_key: &str) -> bool {
        self.granted.lock().await.contains_key(reward_key)
    }
}

impl RewardLedger for InMemoryRewardLedger {
    async fn grant(&self, reward_key: &str, points: u32) -> Result<bool, RewardError> {
        let mut granted = self.granted.lock().await;
        if granted.contains_key(reward_key) {
            return Ok(false);
        }

        granted.insert(reward_key.to_string(), points);
        Ok(true)
    }
}
