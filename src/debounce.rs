use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Propagates a value only after it has stayed unchanged for `delay`.
///
/// Every [`Debouncer::push`] restarts the timer and drops whatever was
/// pending, so a burst of updates yields a single emission of the last one.
/// Emissions equal to the current value are swallowed.
pub struct Debouncer<T> {
    delay: Duration,
    tx: Arc<watch::Sender<T>>,
    pending: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(delay: Duration, initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            delay,
            tx: Arc::new(tx),
            pending: None,
        }
    }

    /// Receiver of settled values. Must be called within a tokio runtime for
    /// emissions to happen.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Last settled value.
    pub fn current(&self) -> T {
        self.tx.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn push(&mut self, value: T) {
        self.cancel();

        let deadline = Instant::now() + self.delay;
        let tx = Arc::clone(&self.tx);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            tx.send_if_modified(|current| {
                if *current == value {
                    return false;
                }
                *current = value;
                true
            });
        }));
    }

    /// Settles `value` now, dropping whatever was pending. Returns `true` if
    /// subscribers were notified.
    pub fn flush(&mut self, value: T) -> bool {
        self.cancel();
        self.tx.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        })
    }

    /// Drops a pending emission, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
