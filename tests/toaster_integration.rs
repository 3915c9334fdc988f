use std::sync::Arc;
use std::time::Duration;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use toaststore::notifications::{
    NotificationState, NotificationUpdate, SequentialIdGenerator, StoreConfig, ToastAction, ToastPayload,
    Toaster, Variant,
};

fn sequential_toaster(capacity: usize, delay_ms: u64) -> Toaster {
    let config = StoreConfig::builder()
        .with_capacity(capacity)
        .with_remove_delay_ms(delay_ms)
        .build()
        .expect("valid store config");
    Toaster::with_id_generator(config, Handle::current(), SequentialIdGenerator::new())
        .expect("toaster on current runtime")
}

fn ids(state: &NotificationState) -> Vec<String> {
    state.ids().map(|id| id.to_string()).collect()
}

#[tokio::test(start_paused = true)]
async fn test_toast_lifecycle_end_to_end() {
    let toaster = sequential_toaster(3, 1000);
    let history: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&history);
    let subscription = toaster.subscribe(move |state: &Arc<NotificationState>| {
        sink.lock().push(ids(state));
    });

    let saved = toaster.enqueue(ToastPayload::titled("Saved"));
    let failed = toaster.enqueue(
        ToastPayload::titled("Delete failed")
            .with_variant(Variant::Destructive)
            .with_action(ToastAction::new("Retry")),
    );
    failed.update(NotificationUpdate::default().description("Disk is read-only"));
    saved.dismiss();

    // Still visible while the exit animation would run
    let closed = saved.get().expect("closed toast still present");
    assert!(!closed.open);

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert!(saved.get().is_some());

    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(saved.get().is_none());

    let current = failed.get().expect("open toast remains");
    assert!(current.open);
    assert_eq!(current.payload.description.as_deref(), Some("Disk is read-only"));

    assert_eq!(
        *history.lock(),
        vec![
            vec!["1".to_string()],
            vec!["2".to_string(), "1".to_string()],
            vec!["2".to_string(), "1".to_string()],
            vec!["2".to_string(), "1".to_string()],
            vec!["2".to_string()],
        ]
    );

    assert!(subscription.unsubscribe());
    toaster.shutdown();
    assert_eq!(history.lock().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_capacity_eviction_with_pending_removal() {
    let toaster = sequential_toaster(2, 500);

    let first = toaster.enqueue(ToastPayload::titled("first"));
    first.dismiss();
    toaster.enqueue(ToastPayload::titled("second"));
    toaster.enqueue(ToastPayload::titled("third"));

    // The dismissed toast was pushed out before its timer fired
    assert_eq!(ids(&toaster.state()), vec!["3", "2"]);
    assert!(first.get().is_none());

    toaster.settle().await;
    assert_eq!(ids(&toaster.state()), vec!["3", "2"]);
    assert_eq!(toaster.stats().evictions, 1);
}

#[tokio::test(start_paused = true)]
async fn test_observer_may_dismiss_during_delivery() {
    let toaster = sequential_toaster(5, 100);

    let inner = toaster.clone();
    toaster.subscribe(move |state: &Arc<NotificationState>| {
        // Auto-dismiss anything titled "flash" as soon as it appears
        let flashing: Vec<_> = state
            .iter()
            .filter(|toast| toast.open && toast.title() == Some("flash"))
            .map(|toast| toast.id().clone())
            .collect();
        for id in flashing {
            inner.dismiss(Some(&id));
        }
    });

    let flash = toaster.enqueue(ToastPayload::titled("flash"));
    let steady = toaster.enqueue(ToastPayload::titled("steady"));

    assert!(!flash.get().expect("flash present").open);
    assert!(toaster.is_removal_pending(flash.id()));

    toaster.settle().await;
    assert!(flash.get().is_none());
    assert!(steady.get().expect("steady present").open);
}

#[test]
fn test_toaster_on_explicit_runtime() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");

    let config = StoreConfig::builder()
        .with_remove_delay_ms(5)
        .build()
        .expect("valid store config");
    let toaster = Toaster::with_runtime(config, runtime.handle().clone()).expect("toaster");

    let handle = toaster.enqueue(ToastPayload::titled("outside"));
    handle.dismiss();
    assert_eq!(toaster.pending_removals(), 1);

    runtime.block_on(toaster.settle());
    assert!(toaster.state().is_empty());
}
