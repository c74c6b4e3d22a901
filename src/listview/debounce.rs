//! Trailing-edge debouncer.
//!
//! Every `push` restarts the quiet period and drops the previously pending
//! value. Only the last value pushed before a quiet period reaches the
//! callback. Emission always happens on a spawned task, even with a zero
//! delay, so `push` never calls back synchronously.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Quiet period used when the caller does not choose one.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(800);

type SettleFn<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Generation counter and idle flag, updated under one lock so a task that
/// was superseded while running can never mark a newer value as settled.
struct Fence {
    generation: Mutex<u64>,
    /// `true` while nothing is waiting to be emitted
    idle: watch::Sender<bool>,
}

impl Fence {
    fn new() -> Self {
        let (idle, _) = watch::channel(true);
        Self {
            generation: Mutex::new(0),
            idle,
        }
    }

    /// Start a new generation with a value pending.
    fn begin(&self) -> u64 {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.idle.send_replace(false);
        *generation
    }

    /// Invalidate every spawned task and report idle.
    fn reset(&self) {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.idle.send_replace(true);
    }

    fn is_current(&self, generation: u64) -> bool {
        *self.generation.lock() == generation
    }

    fn finish(&self, generation: u64) {
        let current = self.generation.lock();
        if *current == generation {
            self.idle.send_replace(true);
        }
    }
}

pub struct Debouncer<T> {
    delay: Duration,
    on_settle: SettleFn<T>,
    pending: Option<JoinHandle<()>>,
    fence: Arc<Fence>,
}

impl<T> std::fmt::Debug for Debouncer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, on_settle: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            on_settle: Arc::new(on_settle),
            pending: None,
            fence: Arc::new(Fence::new()),
        }
    }

    /// Replace the pending value and restart the quiet period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn push(&mut self, value: T) {
        self.abort_pending();
        let generation = self.fence.begin();

        let delay = self.delay;
        let on_settle = Arc::clone(&self.on_settle);
        let fence = Arc::clone(&self.fence);
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !fence.is_current(generation) {
                return;
            }
            on_settle(value);
            fence.finish(generation);
        }));
    }

    /// Drop the pending value without emitting it.
    pub fn cancel(&mut self) {
        self.abort_pending();
        self.fence.reset();
    }
}

impl<T> Debouncer<T> {
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        !*self.fence.idle.borrow()
    }

    /// Watch channel that flips to `true` once nothing is pending.
    pub fn idle_receiver(&self) -> watch::Receiver<bool> {
        self.fence.idle.subscribe()
    }

    /// Wait until the pending value (if any) has been emitted or cancelled.
    pub async fn settled(&self) {
        let mut idle = self.idle_receiver();
        let _ = idle.wait_for(|idle| *idle).await;
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Debouncer<T> {
    /// A debouncer whose settled value is mirrored into a watch channel.
    pub fn mirror(initial: T, delay: Duration) -> (Self, watch::Receiver<T>) {
        let (tx, rx) = watch::channel(initial);
        let debouncer = Self::new(delay, move |value| {
            tx.send_replace(value);
        });
        (debouncer, rx)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.abort_pending();
        self.fence.reset();
    }
}
