//! Periodic maintenance of the exercise registry.

use std::time::Duration;

use chrono::Utc;
use tokio::{task::JoinHandle, time::interval};

use crate::registry::ExerciseRegistry;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Start all background jobs. The handles can be aborted on shutdown.
pub fn start_background_jobs(exercises: ExerciseRegistry, idle_minutes: u32) -> Vec<JoinHandle<()>> {
    vec![tokio::spawn(idle_exercise_sweep_job(exercises, idle_minutes))]
}

/// Unmount exercises whose learner went away without leaving the screen.
async fn idle_exercise_sweep_job(exercises: ExerciseRegistry, idle_minutes: u32) {
    let mut interval = interval(SWEEP_INTERVAL);

    loop {
        interval.tick().await;

        let removed = sweep_idle_exercises(&exercises, idle_minutes).await;
        if removed > 0 {
            tracing::info!(removed, idle_minutes, "Dropped idle exercises");
        } else {
            tracing::debug!("Idle exercise sweep found nothing to drop");
        }
    }
}

pub async fn sweep_idle_exercises(exercises: &ExerciseRegistry, idle_minutes: u32) -> usize {
    let cutoff = Utc::now() - chrono::Duration::minutes(i64::from(idle_minutes));
    exercises.remove_idle(cutoff).await
}
