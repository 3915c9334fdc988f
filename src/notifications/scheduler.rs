//! Eviction Scheduler
//!
//! Turns a dismissal into a `Remove` after a fixed delay. The timer registry
//! maps each notification id to at most one armed one-shot timer; asking to
//! schedule an id that is already armed does nothing.
//!
//! Timers run as tasks on the tokio runtime handed in at construction. A
//! firing timer first drops its own registry entry, then dispatches
//! `Remove(id)` to the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use log::debug;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::notifications::notification::NotificationId;
use crate::notifications::reducer::Action;
use crate::notifications::store::Store;

/// An armed removal timer
struct ArmedTimer {
    /// Distinguishes this arming from a later one for the same id
    generation: u64,
    task: JoinHandle<()>,
}

type TimerRegistry = HashMap<NotificationId, ArmedTimer>;

/// Schedules deferred removal of dismissed notifications
pub struct EvictionScheduler {
    store: Store,
    delay: Duration,
    runtime: Handle,
    registry: Arc<Mutex<TimerRegistry>>,
    /// Signalled whenever the registry becomes empty
    idle: Arc<Notify>,
    next_generation: AtomicU64,
}

impl EvictionScheduler {
    pub fn new(store: Store, delay: Duration, runtime: Handle) -> Self {
        Self {
            store,
            delay,
            runtime,
            registry: Arc::new(Mutex::new(HashMap::new())),
            idle: Arc::new(Notify::new()),
            next_generation: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm a removal timer for `id` unless one is already armed
    ///
    /// Returns `true` if a new timer was armed.
    pub fn schedule_removal(&self, id: &NotificationId) -> bool {
        // Held across spawn + insert so the timer cannot observe the
        // registry before its own entry exists
        let mut registry = self.registry.lock();
        if registry.contains_key(id) {
            debug!("Removal of '{}' already scheduled", id);
            return false;
        }

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + self.delay;
        let task = self.runtime.spawn(fire_at(
            deadline,
            id.clone(),
            generation,
            Arc::clone(&self.registry),
            Arc::clone(&self.idle),
            self.store.clone(),
        ));

        registry.insert(id.clone(), ArmedTimer { generation, task });
        debug!("Scheduled removal of '{}' in {:?}", id, self.delay);
        true
    }

    /// Disarm the timer for `id` without firing it
    ///
    /// Returns `true` if a timer was armed.
    pub fn cancel(&self, id: &NotificationId) -> bool {
        let mut registry = self.registry.lock();
        match registry.remove(id) {
            Some(timer) => {
                timer.task.abort();
                if registry.is_empty() {
                    self.idle.notify_waiters();
                }
                debug!("Cancelled removal of '{}'", id);
                true
            }
            None => false,
        }
    }

    /// Disarm every timer; returns how many were armed
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<(NotificationId, ArmedTimer)> = self.registry.lock().drain().collect();
        for (_, timer) in &drained {
            timer.task.abort();
        }
        self.idle.notify_waiters();
        if !drained.is_empty() {
            debug!("Cancelled {} pending removals", drained.len());
        }
        drained.len()
    }

    pub fn is_scheduled(&self, id: &NotificationId) -> bool {
        self.registry.lock().contains_key(id)
    }

    /// Number of timers currently armed
    pub fn armed_count(&self) -> usize {
        self.registry.lock().len()
    }

    /// Wait until no timer is armed
    pub async fn wait_until_idle(&self) {
        loop {
            let idle = self.idle.notified();
            tokio::pin!(idle);
            // Register before checking so a concurrent drain cannot be missed
            idle.as_mut().enable();

            if self.armed_count() == 0 {
                return;
            }
            idle.await;
        }
    }
}

impl Drop for EvictionScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl std::fmt::Debug for EvictionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvictionScheduler")
            .field("delay", &self.delay)
            .field("armed", &self.armed_count())
            .finish()
    }
}

async fn fire_at(
    deadline: Instant,
    id: NotificationId,
    generation: u64,
    registry: Arc<Mutex<TimerRegistry>>,
    idle: Arc<Notify>,
    store: Store,
) {
    tokio::time::sleep_until(deadline).await;

    {
        let mut registry = registry.lock();
        // Cancelled, or superseded by a newer arming
        if registry.get(&id).map(|timer| timer.generation) != Some(generation) {
            return;
        }
        registry.remove(&id);
        if registry.is_empty() {
            idle.notify_waiters();
        }
    }

    debug!("Removal timer for '{}' fired", id);
    store.dispatch(Action::Remove(Some(id)));
}
