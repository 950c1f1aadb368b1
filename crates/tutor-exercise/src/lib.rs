//! Exercise instance state shared by every sentence building exercise.
//!
//! An [`ExerciseInstance`] owns its memoized word bank and its attempt state;
//! the [`CompletionGate`] makes sure the reward ledger is asked at most once per
//! instance, however many times completion fires.

pub mod error;
pub mod gate;
pub mod instance;
pub mod reward;
pub mod tracking;

pub use error::RewardError;
pub use gate::{Completion, CompletionGate};
pub use instance::{ExerciseContent, ExerciseInstance, Judgement, SubmitOutcome};
pub use reward::{InMemoryRewardLedger, RewardLedger};
pub use tracking::{InMemoryMasteryTracker, MasteryRecord, MasteryTracker, UnitOutcome};
