//! Toaster: the public notification API
//!
//! Wraps a [`Store`] and its [`EvictionScheduler`] and owns identifier
//! generation. External code creates, updates, dismisses and observes
//! notifications only through this type; it never touches the state or the
//! timer registry directly.

use std::sync::Arc;
use log::{debug, info};
use tokio::runtime::Handle;

use crate::notifications::config::StoreConfig;
use crate::notifications::error::{ToastError, ToastResult};
use crate::notifications::id::{IdGenerator, RandomIdGenerator};
use crate::notifications::notification::{Notification, NotificationId, NotificationUpdate, ToastPayload};
use crate::notifications::reducer::{Action, NotificationState};
use crate::notifications::scheduler::EvictionScheduler;
use crate::notifications::store::{Observer, Store, StoreStats, Subscription, SubscriptionId};

struct ToasterInner {
    config: StoreConfig,
    store: Store,
    scheduler: EvictionScheduler,
    ids: Box<dyn IdGenerator>,
}

/// Independent notification store with timed eviction
///
/// Cloning yields another handle to the same store.
#[derive(Clone)]
pub struct Toaster {
    inner: Arc<ToasterInner>,
}

impl Toaster {
    /// Create a toaster whose removal timers run on the current tokio runtime
    pub fn new(config: StoreConfig) -> ToastResult<Self> {
        let runtime = Handle::try_current().map_err(|_| ToastError::NoRuntime)?;
        Self::with_runtime(config, runtime)
    }

    /// Create a toaster whose removal timers run on `runtime`
    pub fn with_runtime(config: StoreConfig, runtime: Handle) -> ToastResult<Self> {
        Self::with_id_generator(config, runtime, RandomIdGenerator)
    }

    /// Create a toaster with a custom identifier source
    pub fn with_id_generator<G>(config: StoreConfig, runtime: Handle, ids: G) -> ToastResult<Self>
    where
        G: IdGenerator + 'static,
    {
        config.validate()?;

        let store = Store::new(config.capacity);
        let scheduler = EvictionScheduler::new(store.clone(), config.remove_delay, runtime);
        debug!(
            "Created toaster (capacity {}, remove delay {:?})",
            config.capacity, config.remove_delay
        );

        Ok(Self {
            inner: Arc::new(ToasterInner {
                config,
                store,
                scheduler,
                ids: Box::new(ids),
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Add a new open notification to the front of the list
    ///
    /// When the store is full the oldest notification is dropped silently.
    pub fn enqueue(&self, payload: ToastPayload) -> ToastHandle {
        let id = self.inner.ids.next_id();
        debug!("Enqueueing notification '{}'", id);

        self.inner
            .store
            .dispatch(Action::Add(Notification::new(id.clone(), payload)));

        ToastHandle {
            id,
            toaster: self.clone(),
        }
    }

    /// Merge `update` into the notification with the same id
    pub fn update(&self, update: NotificationUpdate) {
        self.inner.store.dispatch(Action::Update(update));
    }

    /// Close one notification, or all of them when `id` is `None`, and
    /// schedule each closed notification for removal
    ///
    /// Repeated dismissals never arm a second timer for the same id.
    pub fn dismiss(&self, id: Option<&NotificationId>) {
        let state = self.inner.store.dispatch(Action::Dismiss(id.cloned()));

        match id {
            Some(id) => {
                if state.contains(id) {
                    self.inner.scheduler.schedule_removal(id);
                }
            }
            None => {
                for id in state.ids() {
                    self.inner.scheduler.schedule_removal(id);
                }
            }
        }
    }

    /// Close every notification
    pub fn dismiss_all(&self) {
        self.dismiss(None);
    }

    /// Register an observer for every subsequent state change
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer + 'static,
    {
        self.inner.store.subscribe(observer)
    }

    /// Register an observer that is also held elsewhere
    pub fn subscribe_arc(&self, observer: Arc<dyn Observer>) -> Subscription {
        self.inner.store.subscribe_arc(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.store.unsubscribe(id)
    }

    /// Current state snapshot
    pub fn state(&self) -> Arc<NotificationState> {
        self.inner.store.state()
    }

    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.state().get(id).cloned()
    }

    /// Number of removals armed and not yet fired
    pub fn pending_removals(&self) -> usize {
        self.inner.scheduler.armed_count()
    }

    pub fn is_removal_pending(&self, id: &NotificationId) -> bool {
        self.inner.scheduler.is_scheduled(id)
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.store.stats()
    }

    /// Wait until every armed removal has fired or been cancelled
    pub async fn settle(&self) {
        self.inner.scheduler.wait_until_idle().await;
    }

    /// Tear the store down: disarm all timers and remove every notification
    pub fn shutdown(&self) {
        let cancelled = self.inner.scheduler.cancel_all();
        self.inner.store.dispatch(Action::Remove(None));
        info!("Toaster shut down ({} pending removals cancelled)", cancelled);
    }
}

impl std::fmt::Debug for Toaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Toaster")
            .field("config", &self.inner.config)
            .field("store", &self.inner.store)
            .field("scheduler", &self.inner.scheduler)
            .finish()
    }
}

/// Handle to one enqueued notification
#[derive(Debug, Clone)]
pub struct ToastHandle {
    id: NotificationId,
    toaster: Toaster,
}

impl ToastHandle {
    pub fn id(&self) -> &NotificationId {
        &self.id
    }

    /// Dismiss this notification and schedule its removal
    pub fn dismiss(&self) {
        self.toaster.dismiss(Some(&self.id));
    }

    /// Merge `partial` into this notification; any id it carries is replaced
    pub fn update(&self, mut partial: NotificationUpdate) {
        partial.id = self.id.clone();
        self.toaster.update(partial);
    }

    /// Open-state callback for renderers: closing dismisses, reopening
    /// disarms any pending removal
    pub fn set_open(&self, open: bool) {
        if open {
            self.toaster.inner.scheduler.cancel(&self.id);
            self.update(NotificationUpdate::default().open(true));
        } else {
            self.dismiss();
        }
    }

    /// Current value of this notification, if still present
    pub fn get(&self) -> Option<Notification> {
        self.toaster.get(&self.id)
    }
}
