//! Notification Store
//!
//! Holds the single notification state and the ordered observer list. Every
//! dispatch runs the reducer, swaps the new state in and hands the same
//! snapshot to every observer, in registration order, before returning.
//! When an observer dispatches from its callback, the observers after it
//! receive the state that nested dispatch produced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use log::{debug, trace};
use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::notifications::reducer::{reduce_counted, Action, NotificationState};

/// Receives every state snapshot produced after a dispatch
pub trait Observer: Send + Sync {
    fn on_change(&self, state: &Arc<NotificationState>);
}

impl<F> Observer for F
where
    F: Fn(&Arc<NotificationState>) + Send + Sync,
{
    fn on_change(&self, state: &Arc<NotificationState>) {
        self(state)
    }
}

/// Identifier of a registered observer
pub type SubscriptionId = u64;

/// Counters describing store activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total actions dispatched
    pub dispatches: u64,
    /// Total observer invocations
    pub deliveries: u64,
    /// Entries silently dropped to respect capacity
    pub evictions: u64,
}

struct StoreInner {
    capacity: usize,
    /// Serializes whole dispatches; re-entrant so observers may dispatch
    dispatch_lock: ReentrantMutex<()>,
    state: RwLock<Arc<NotificationState>>,
    observers: Mutex<Vec<(SubscriptionId, Arc<dyn Observer>)>>,
    next_subscription: AtomicU64,
    stats: Mutex<StoreStats>,
}

/// Shared handle to a notification store
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Create an empty store holding at most `capacity` notifications
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                capacity,
                dispatch_lock: ReentrantMutex::new(()),
                state: RwLock::new(Arc::new(NotificationState::new())),
                observers: Mutex::new(Vec::new()),
                next_subscription: AtomicU64::new(1),
                stats: Mutex::new(StoreStats::default()),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Current state snapshot
    pub fn state(&self) -> Arc<NotificationState> {
        Arc::clone(&self.inner.state.read())
    }

    /// Apply `action` and notify every observer before returning
    pub fn dispatch(&self, action: Action) -> Arc<NotificationState> {
        let _dispatching = self.inner.dispatch_lock.lock();

        // Observers registered from here on miss this dispatch
        let observers: Vec<Arc<dyn Observer>> = self
            .inner
            .observers
            .lock()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        let (next, evicted) = {
            let mut state = self.inner.state.write();
            let reduction = reduce_counted(&state, &action, self.inner.capacity);
            let next = Arc::new(reduction.state);
            *state = Arc::clone(&next);
            (next, reduction.evicted)
        };

        debug!(
            "Dispatched {} ({} notifications, {} evicted, {} observers)",
            action.name(),
            next.len(),
            evicted,
            observers.len()
        );

        // An observer may dispatch again; later observers get the newest state
        for observer in &observers {
            let current = self.state();
            observer.on_change(&current);
        }
        trace!("Notified {} observers of {}", observers.len(), action.name());

        let mut stats = self.inner.stats.lock();
        stats.dispatches += 1;
        stats.deliveries += observers.len() as u64;
        stats.evictions += evicted as u64;

        next
    }

    /// Register an observer for all subsequent dispatches
    ///
    /// The observer is not called at registration; use [`Store::state`] to
    /// read the current snapshot.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer + 'static,
    {
        self.subscribe_arc(Arc::new(observer))
    }

    /// Register a shared observer
    pub fn subscribe_arc(&self, observer: Arc<dyn Observer>) -> Subscription {
        let id = self.inner.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.inner.observers.lock().push((id, observer));
        debug!("Observer {} subscribed", id);

        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    /// Remove an observer; returns `false` if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_observer(&self.inner, id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.observers.lock().len()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.stats.lock().clone()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("capacity", &self.inner.capacity)
            .field("notifications", &self.state().len())
            .field("observers", &self.observer_count())
            .finish()
    }
}

fn remove_observer(inner: &StoreInner, id: SubscriptionId) -> bool {
    let mut observers = inner.observers.lock();
    let before = observers.len();
    observers.retain(|(observer_id, _)| *observer_id != id);

    let removed = observers.len() < before;
    if removed {
        debug!("Observer {} unsubscribed", id);
    }
    removed
}

/// Handle returned by `subscribe`; calling [`Subscription::unsubscribe`]
/// stops further notifications
///
/// Dropping the handle leaves the observer registered.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    store: Weak<StoreInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Unregister the observer; returns `false` if the store is gone or the
    /// observer was already removed
    pub fn unsubscribe(self) -> bool {
        match self.store.upgrade() {
            Some(inner) => remove_observer(&inner, self.id),
            None => false,
        }
    }
}
