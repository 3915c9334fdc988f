//! Ephemeral Notification Store
//!
//! A bounded, observable store for transient user-facing messages (toasts).
//!
//! # Architecture
//!
//! - **Reducer**: pure `(state, action) -> state` transitions
//! - **Store**: holds the state and fans every change out to observers
//! - **EvictionScheduler**: arms at most one removal timer per dismissed id
//! - **Toaster**: the public API; generates ids and wires the pieces together
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use toaststore::notifications::{NotificationState, StoreConfig, Toaster, ToastPayload};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let toaster = Toaster::new(StoreConfig::default())?;
//!
//! toaster.subscribe(|state: &Arc<NotificationState>| {
//!     println!("{} notifications", state.len());
//! });
//!
//! let toast = toaster.enqueue(ToastPayload::titled("Saved"));
//! toast.dismiss();
//! toaster.settle().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod notification;
pub mod reducer;
pub mod scheduler;
pub mod store;
pub mod toaster;


pub use config::{StoreConfig, StoreConfigBuilder, DEFAULT_REMOVE_DELAY};
pub use error::{ToastError, ToastResult};
pub use id::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use notification::{Notification, NotificationId, NotificationUpdate, ToastAction, ToastPayload, Variant};
pub use reducer::{reduce, Action, NotificationState, DEFAULT_CAPACITY};
pub use scheduler::EvictionScheduler;
pub use store::{Observer, Store, StoreStats, Subscription, SubscriptionId};
pub use toaster::{ToastHandle, Toaster};
