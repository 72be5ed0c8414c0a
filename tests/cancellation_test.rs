use std::sync::mpsc;
use std::time::Duration;

use docchat::infrastructure::cancellation::{CancellationFlag, spawn_cancellable};

#[test]
fn given_guard_when_dropped_then_flag_is_cancelled() {
    let flag = CancellationFlag::new();
    let guard = flag.cancel_on_drop();
    assert!(!flag.is_cancelled());

    drop(guard);

    assert!(flag.is_cancelled());
}

#[tokio::test]
async fn given_finished_work_when_awaiting_then_result_is_returned() {
    let result = spawn_cancellable(|cancelled| !cancelled.is_cancelled()).await;

    assert!(result.unwrap());
}

#[tokio::test]
async fn given_timeout_elapses_when_work_is_running_then_worker_stops() {
    let (stopped_tx, stopped_rx) = mpsc::channel();

    let outcome = tokio::time::timeout(
        Duration::from_millis(50),
        spawn_cancellable(move |cancelled| {
            let mut steps = 0u32;
            while !cancelled.is_cancelled() && steps < 1_000 {
                std::thread::sleep(Duration::from_millis(5));
                steps += 1;
            }
            let _ = stopped_tx.send(cancelled.is_cancelled());
        }),
    )
    .await;

    assert!(outcome.is_err());
    let stopped = tokio::task::spawn_blocking(move || {
        stopped_rx.recv_timeout(Duration::from_secs(2))
    })
    .await
    .unwrap();
    assert_eq!(stopped, Ok(true));
}
