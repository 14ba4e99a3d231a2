//! Cancellable delayed tasks
//!
//! Each task runs under a key. Scheduling a new task under a key aborts the
//! one still pending there, so a newer control operation supersedes a stale
//! reconcile or launch timer instead of racing it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Logical target of a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKey {
    /// Delayed resync of the running track
    Reconcile,

    /// Delayed opening of a player application
    PlayerLaunch,
}

/// Keyed set of delayed tasks on the current tokio runtime
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    tasks: Arc<Mutex<HashMap<TaskKey, JoinHandle<()>>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`, superseding any pending task under `key`
    pub fn schedule<F>(&self, key: TaskKey, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let previous = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, handle);

        if let Some(previous) = previous {
            if !previous.is_finished() {
                debug!(?key, "Superseding pending task");
                previous.abort();
            }
        }
    }

    /// Abort the pending task under `key`. Returns whether one was pending.
    pub fn cancel(&self, key: TaskKey) -> bool {
        let handle = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);

        match handle {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    /// Whether a task under `key` has not finished yet
    pub fn is_pending(&self, key: TaskKey) -> bool {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort every pending task
    pub fn cancel_all(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        for (_, handle) in tasks.drain() {
            handle.abort();
        }
    }
}
