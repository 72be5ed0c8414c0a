use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::task::JoinError;

/// Flag polled by blocking workers whose caller may stop waiting.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop(self.clone())
    }
}

pub struct CancelOnDrop(CancellationFlag);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Runs `work` on the blocking pool. Dropping the returned future, for
/// example when an enclosing `tokio::time::timeout` elapses, cancels the
/// flag handed to `work`.
pub async fn spawn_cancellable<F, T>(work: F) -> Result<T, JoinError>
where
    F: FnOnce(&CancellationFlag) -> T + Send + 'static,
    T: Send + 'static,
{
    let flag = CancellationFlag::new();
    let _guard = flag.cancel_on_drop();
    let worker_flag = flag.clone();

    tokio::task::spawn_blocking(move || work(&worker_flag)).await
}
