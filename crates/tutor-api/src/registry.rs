//! Mounted exercise instances, keyed by id.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tutor_exercise::ExerciseInstance;
use uuid::Uuid;

use crate::error::ApiError;

/// Shared map of live instances.
///
/// The lock is only held for synchronous work on one instance; callers that
/// need to await (the reward ledger) copy what they need out first.
#[derive(Clone, Debug, Default)]
pub struct ExerciseRegistry {
    instances: Arc<Mutex<HashMap<Uuid, ExerciseInstance>>>,
}

impl ExerciseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, instance: ExerciseInstance) -> Uuid {
        let id = instance.id();
        self.instances.lock().await.insert(id, instance);
        id
    }

    /// Run `f` against the instance with `id`.
    pub async fn with<F, T>(&self, id: Uuid, f: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut ExerciseInstance) -> T,
    {
        let mut instances = self.instances.lock().await;
        let instance = instances
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Exercise {id} not found")))?;
        Ok(f(instance))
    }

    /// Unmount an instance. Returns whether it existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.instances.lock().await.remove(&id).is_some()
    }

    /// Drop every instance not touched since `cutoff`.
    pub async fn remove_idle(&self, cutoff: DateTime<Utc>) -> usize {
        let mut instances = self.instances.lock().await;
        let before = instances.len();
        instances.retain(|_, instance| instance.last_active_at() >= cutoff);
        before - instances.len()
    }

    pub async fn len(&self) -> usize {
        self.instances.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.instances.lock().await.is_empty()
    }
}
