// src/search/debounce.rs
//! Single-shot debounce timer for free-text search.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Runs at most one pending action: scheduling a new one aborts the previous
/// timer, and dropping the debouncer aborts whatever is still pending so no
/// callback fires after teardown.
pub struct Debouncer {
    window: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `action` to run after the debounce window, replacing any
    /// previously scheduled action.
    pub fn schedule<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let window = self.window;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            action.await;
        });

        let mut pending = self.pending.lock().expect("debounce timer lock poisoned");
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Abort the pending action, if any.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().expect("debounce timer lock poisoned");
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_scheduled_action_fires() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            debouncer.schedule(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rekey_restarts_the_window() {
        let debouncer = Debouncer::new(Duration::from_millis(500));
        let fired = Arc::new(AtomicUsize::new(0));

        {
            let fired = Arc::clone(&fired);
            debouncer.schedule(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        {
            let fired = Arc::clone(&fired);
            debouncer.schedule(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        // The first window would have elapsed here; it was replaced.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_action() {
        let fired = Arc::new(AtomicUsize::new(0));

        {
            let debouncer = Debouncer::new(Duration::from_millis(500));
            let fired = Arc::clone(&fired);
            debouncer.schedule(async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
