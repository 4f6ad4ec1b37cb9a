//! Poll-driven handle for async work started from the UI loop.
//!
//! Views cannot await, so they start work with `AsyncTask::start` and call
//! `poll()` on every tick until the result arrives.
//!
//! ```ignore
//! let cache = cache.clone();
//! let mut load = AsyncTask::new();
//! load.start(async move { cache.get_or_fetch().await });
//!
//! // In the tick handler
//! if load.poll() {
//!     // State changed, re-render
//! }
//! ```

use std::future::Future;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;

/// Where a task is in its lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState<T, E> {
  /// Never started
  Idle,
  Running,
  Succeeded(T),
  Failed(E),
  /// Aborted via `cancel()` before finishing
  Cancelled,
}

/// A spawned future whose result is picked up by polling.
///
/// Dropping the handle does not stop the work; only `cancel()` does.
pub struct AsyncTask<T, E> {
  state: TaskState<T, E>,
  receiver: Option<oneshot::Receiver<Result<T, E>>>,
  abort: Option<AbortHandle>,
}

impl<T, E> Default for AsyncTask<T, E> {
  fn default() -> Self {
    Self {
      state: TaskState::Idle,
      receiver: None,
      abort: None,
    }
  }
}

impl<T: Send + 'static, E: Send + 'static> AsyncTask<T, E> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Spawn `future`, replacing (and aborting) any run in progress.
  pub fn start<F>(&mut self, future: F)
  where
    F: Future<Output = Result<T, E>> + Send + 'static,
  {
    if let Some(abort) = self.abort.take() {
      abort.abort();
    }

    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
      // Receiver may be gone if the owner was dropped
      let _ = tx.send(future.await);
    });

    self.receiver = Some(rx);
    self.abort = Some(handle.abort_handle());
    self.state = TaskState::Running;
  }

  /// Abort the running future. No-op unless running.
  pub fn cancel(&mut self) {
    if !self.is_running() {
      return;
    }
    if let Some(abort) = self.abort.take() {
      abort.abort();
    }
    self.receiver = None;
    self.state = TaskState::Cancelled;
  }

  /// Pick up the result if it has arrived. Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let Some(receiver) = &mut self.receiver else {
      return false;
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => self.finish(TaskState::Succeeded(data)),
      Ok(Err(error)) => self.finish(TaskState::Failed(error)),
      Err(oneshot::error::TryRecvError::Empty) => false,
      // Sender dropped without a value: the task was aborted or panicked
      Err(oneshot::error::TryRecvError::Closed) => self.finish(TaskState::Cancelled),
    }
  }

  fn finish(&mut self, state: TaskState<T, E>) -> bool {
    self.state = state;
    self.receiver = None;
    self.abort = None;
    true
  }
}

impl<T, E> AsyncTask<T, E> {
  pub fn state(&self) -> &TaskState<T, E> {
    &self.state
  }

  pub fn is_running(&self) -> bool {
    matches!(self.state, TaskState::Running)
  }

  pub fn data(&self) -> Option<&T> {
    match &self.state {
      TaskState::Succeeded(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&E> {
    match &self.state {
      TaskState::Failed(e) => Some(e),
      _ => None,
    }
  }
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> std::fmt::Debug for AsyncTask<T, E> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("AsyncTask")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}
