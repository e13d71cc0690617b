use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::Debouncer;

type Log = Arc<Mutex<Vec<(String, u32)>>>;

fn record(log: &Log, key: &str, value: u32) {
    log.lock().expect("log").push((key.to_string(), value));
}

fn entries(log: &Log) -> Vec<(String, u32)> {
    log.lock().expect("log").clone()
}

#[tokio::test(start_paused = true)]
async fn burst_on_one_key_runs_only_the_last_action() {
    let debouncer = Debouncer::<&'static str>::new();
    let log: Log = Arc::default();
    let delay = Duration::from_millis(300);

    for value in 1..=5 {
        let log = Arc::clone(&log);
        debouncer.schedule("brightness", delay, move |_| async move {
            record(&log, "brightness", value);
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    debouncer.settle().await;

    assert_eq!(entries(&log), vec![("brightness".to_string(), 5)]);
}

#[tokio::test(start_paused = true)]
async fn distinct_keys_do_not_interfere() {
    let debouncer = Debouncer::<&'static str>::new();
    let log: Log = Arc::default();
    let delay = Duration::from_millis(200);

    for (key, value) in [("brightness", 1), ("contrast", 10), ("brightness", 2)] {
        let log = Arc::clone(&log);
        debouncer.schedule(key, delay, move |_| async move {
            record(&log, key, value);
        });
    }
    debouncer.settle().await;

    let mut seen = entries(&log);
    seen.sort();
    assert_eq!(
        seen,
        vec![("brightness".to_string(), 2), ("contrast".to_string(), 10)]
    );
}

#[tokio::test(start_paused = true)]
async fn actions_spaced_beyond_the_delay_all_run() {
    let debouncer = Debouncer::<&'static str>::new();
    let log: Log = Arc::default();
    let delay = Duration::from_millis(50);

    for value in 1..=3 {
        let log = Arc::clone(&log);
        debouncer.schedule("hue", delay, move |_| async move {
            record(&log, "hue", value);
        });
        tokio::time::sleep(Duration::from_millis(120)).await;
    }
    debouncer.settle().await;

    assert_eq!(entries(&log).len(), 3);
}

#[tokio::test(start_paused = true)]
async fn running_action_sees_its_ticket_go_stale() {
    let debouncer = Debouncer::<&'static str>::new();
    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let observed = Arc::new(Mutex::new(None));

    let seen = Arc::clone(&observed);
    let delay = Duration::from_millis(10);
    let first = debouncer.schedule("threshold", delay, move |ticket| async move {
        let _ = started_tx.send(());
        let _ = release_rx.await;
        *seen.lock().expect("seen") = Some(ticket.is_current());
    });
    started_rx.await.expect("first action started");
    assert!(first.is_current());

    let second = debouncer.schedule("threshold", Duration::from_millis(10), |_| async {});
    assert!(!first.is_current());
    assert!(second.is_current());
    assert!(second.generation() > first.generation());

    let _ = release_tx.send(());
    debouncer.settle().await;
    assert_eq!(*observed.lock().expect("observed"), Some(false));
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_a_pending_timer() {
    let debouncer = Debouncer::<&'static str>::new();
    let log: Log = Arc::default();
    let captured = Arc::clone(&log);
    debouncer.schedule("grayscale", Duration::from_millis(100), move |_| async move {
        record(&captured, "grayscale", 1);
    });
    assert!(debouncer.is_pending(&"grayscale"));
    assert_eq!(debouncer.pending_keys(), vec!["grayscale"]);

    assert!(debouncer.cancel(&"grayscale"));
    assert!(!debouncer.is_pending(&"grayscale"));
    debouncer.settle().await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(entries(&log).is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_all_stales_running_actions_and_drops_pending_ones() {
    let debouncer = Debouncer::<&'static str>::new();
    let log: Log = Arc::default();
    let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let observed = Arc::new(Mutex::new(None));

    let seen = Arc::clone(&observed);
    let running = debouncer.schedule("brightness", Duration::from_millis(10), move |ticket| {
        async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            *seen.lock().expect("seen") = Some(ticket.is_current());
        }
    });
    started_rx.await.expect("action started");

    let captured = Arc::clone(&log);
    let pending = debouncer.schedule("contrast", Duration::from_millis(500), move |_| async move {
        record(&captured, "contrast", 1);
    });
    assert!(running.is_current());
    assert!(pending.is_current());

    debouncer.cancel_all();
    assert!(!running.is_current());
    assert!(!pending.is_current());
    assert!(debouncer.pending_keys().is_empty());

    let _ = release_tx.send(());
    debouncer.settle().await;
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(*observed.lock().expect("observed"), Some(false));
    assert!(entries(&log).is_empty());
}
