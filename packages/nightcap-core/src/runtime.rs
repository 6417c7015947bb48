//! Task spawning and scheduled-task ownership.
//!
//! [`TaskSpawner`] lets the player services start background work without
//! being tied to a particular runtime handle. [`ScheduledTask`] is the owned
//! handle for periodic work (countdown ticks, clock ticks): dropping or
//! cancelling it stops the task, so no tick callback outlives its owner.

use std::future::Future;

use tokio_util::sync::CancellationToken;

/// Abstraction for spawning background tasks.
///
/// # Example
///
/// ```ignore
/// struct MyService {
///     spawner: TokioSpawner,
/// }
///
/// impl MyService {
///     fn start_background_work(&self) {
///         self.spawner.spawn(async {
///             // Background work here
///         });
///     }
/// }
/// ```
pub trait TaskSpawner: Send + Sync {
    /// Spawns a future as a background task.
    ///
    /// The spawner itself offers no way to cancel or join the task; use
    /// [`ScheduledTask`] for work that must be cancellable.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Tokio-based spawner.
#[derive(Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

impl TokioSpawner {
    /// Creates a new `TokioSpawner` using the current runtime's handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context.
    #[must_use]
    pub fn current() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl TaskSpawner for TokioSpawner {
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }
}

/// Owned handle to a cancellable background task.
///
/// The task body receives a child of `parent`, so cancelling the parent
/// (component shutdown) stops every task scheduled under it. The body is
/// responsible for observing the token at its suspension points.
///
/// Dropping the handle cancels the task.
#[derive(Debug)]
pub struct ScheduledTask {
    token: CancellationToken,
}

impl ScheduledTask {
    /// Spawns `body` with a fresh child token of `parent`.
    pub fn spawn<S, F, Fut>(spawner: &S, parent: &CancellationToken, body: F) -> Self
    where
        S: TaskSpawner + ?Sized,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = parent.child_token();
        spawner.spawn(body(token.clone()));
        Self { token }
    }

    /// Requests cancellation of the task.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has been requested (directly or via the parent).
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn tokio_spawner_executes_task() {
        let spawner = TokioSpawner::current();
        let executed = Arc::new(AtomicBool::new(false));
        let executed_clone = executed.clone();

        spawner.spawn(async move {
            executed_clone.store(true, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(executed.load(Ordering::SeqCst));
    }

    /// Spawns a task that counts 100ms ticks until cancelled.
    fn counting_task(parent: &CancellationToken, ticks: Arc<AtomicUsize>) -> ScheduledTask {
        ScheduledTask::spawn(&TokioSpawner::current(), parent, move |token| async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = tokio::time::sleep(Duration::from_millis(100)) => {
                        ticks.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        })
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_task() {
        let parent = CancellationToken::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let task = counting_task(&parent, ticks.clone());

        tokio::time::sleep(Duration::from_millis(350)).await;
        let seen = ticks.load(Ordering::SeqCst);
        assert_eq!(seen, 3);

        drop(task);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_reaches_task() {
        let parent = CancellationToken::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let task = counting_task(&parent, ticks.clone());

        parent.cancel();
        assert!(task.is_cancelled());

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }
}
