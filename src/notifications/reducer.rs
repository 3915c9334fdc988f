//! Notification Reducer
//!
//! Pure state transitions for the notification store. The reducer never
//! touches timers or observers; it maps the current state and one action to
//! the next state and leaves its input untouched.

use serde::Serialize;

use crate::notifications::notification::{Notification, NotificationId, NotificationUpdate};

/// Default maximum number of notifications held at once
pub const DEFAULT_CAPACITY: usize = 5;

/// Actions understood by the reducer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Prepend a notification, truncating the oldest beyond capacity
    Add(Notification),

    /// Shallow-merge a partial into the matching notification
    Update(NotificationUpdate),

    /// Close one notification, or every notification when `None`
    Dismiss(Option<NotificationId>),

    /// Delete one notification, or clear the state when `None`
    Remove(Option<NotificationId>),
}

impl Action {
    /// Short name used in log output
    pub fn name(&self) -> &'static str {
        match self {
            Action::Add(_) => "ADD",
            Action::Update(_) => "UPDATE",
            Action::Dismiss(_) => "DISMISS",
            Action::Remove(_) => "REMOVE",
        }
    }
}

/// Ordered notification sequence, newest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotificationState {
    toasts: Vec<Notification>,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> &[Notification] {
        &self.toasts
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.toasts.iter().find(|toast| toast.id() == id)
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &NotificationId> {
        self.toasts.iter().map(Notification::id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter()
    }
}

/// Outcome of a reduction
#[derive(Debug, Clone)]
pub struct Reduction {
    pub state: NotificationState,
    /// Number of entries dropped off the tail to respect capacity
    pub evicted: usize,
}

/// Apply `action` to `state`, returning the next state
pub fn reduce(state: &NotificationState, action: &Action, capacity: usize) -> NotificationState {
    reduce_counted(state, action, capacity).state
}

/// Like [`reduce`], also reporting how many entries capacity truncation evicted
pub fn reduce_counted(state: &NotificationState, action: &Action, capacity: usize) -> Reduction {
    match action {
        Action::Add(toast) => {
            let mut toasts = Vec::with_capacity(state.len() + 1);
            toasts.push(toast.clone());
            toasts.extend(state.toasts.iter().cloned());

            let evicted = toasts.len().saturating_sub(capacity);
            toasts.truncate(capacity);

            Reduction {
                state: NotificationState { toasts },
                evicted,
            }
        }
        Action::Update(update) => {
            let toasts = state
                .toasts
                .iter()
                .map(|toast| {
                    let mut toast = toast.clone();
                    if toast.id() == &update.id {
                        toast.merge(update);
                    }
                    toast
                })
                .collect();
            unchanged_capacity(toasts)
        }
        Action::Dismiss(target) => {
            let toasts = state
                .toasts
                .iter()
                .map(|toast| {
                    let mut toast = toast.clone();
                    if target.as_ref().map_or(true, |id| toast.id() == id) {
                        toast.open = false;
                    }
                    toast
                })
                .collect();
            unchanged_capacity(toasts)
        }
        Action::Remove(Some(id)) => {
            let toasts = state
                .toasts
                .iter()
                .filter(|toast| toast.id() != id)
                .cloned()
                .collect();
            unchanged_capacity(toasts)
        }
        Action::Remove(None) => unchanged_capacity(Vec::new()),
    }
}

fn unchanged_capacity(toasts: Vec<Notification>) -> Reduction {
    Reduction {
        state: NotificationState { toasts },
        evicted: 0,
    }
}
