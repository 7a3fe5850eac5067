use crate::error::CallStackError;
use parking_lot::{Condvar, Mutex};
use std::any::Any;
use std::borrow::Cow;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::debug;

/// A unit of work handed to an [`Executor`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on worker threads.
///
/// The lifecycle follows the usual executor service contract: after
/// [`Executor::shutdown`] new tasks are rejected, while tasks already handed
/// over run to completion.
pub trait Executor: Send + Sync {
    /// Hands `task` over to a worker.
    ///
    /// # Errors
    /// Returns [`CallStackError::Rejected`] after shutdown. Implementations
    /// may fail for their own reasons, e.g. [`CallStackError::Spawn`].
    fn execute(&self, task: Task) -> Result<(), CallStackError>;

    /// Stops accepting new tasks.
    fn shutdown(&self);

    fn is_shutdown(&self) -> bool;

    /// `true` once shut down with no task left running.
    fn is_terminated(&self) -> bool;

    /// Blocks until terminated or until `timeout` elapses. Returns whether
    /// the executor terminated.
    fn await_termination(&self, timeout: Duration) -> bool;

    /// Runs `f` and returns a handle to its result.
    ///
    /// # Errors
    /// Same as [`Executor::execute`].
    fn submit<F, R>(&self, f: F) -> Result<TaskHandle<R>, CallStackError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
        Self: Sized,
    {
        let (tx, rx) = oneshot::channel();
        self.execute(Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(f)).map_err(panic_message);
            // The caller may have dropped the handle.
            let _ = tx.send(outcome);
        }))?;
        Ok(TaskHandle { rx })
    }
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, task: Task) -> Result<(), CallStackError> {
        (**self).execute(task)
    }

    fn shutdown(&self) {
        (**self).shutdown();
    }

    fn is_shutdown(&self) -> bool {
        (**self).is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        (**self).is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        (**self).await_termination(timeout)
    }
}

/// Result of a task started with [`Executor::submit`].
#[must_use = "dropping the handle discards the task result"]
#[derive(Debug)]
pub struct TaskHandle<R> {
    rx: oneshot::Receiver<Result<R, Cow<'static, str>>>,
}

impl<R> TaskHandle<R> {
    /// Blocks the calling thread until the task finished.
    ///
    /// Must not be called from inside an async runtime; use
    /// [`TaskHandle::wait`] there.
    ///
    /// # Errors
    /// Returns [`CallStackError::TaskFailed`] if the task panicked or was
    /// dropped without running.
    pub fn join(self) -> Result<R, CallStackError> {
        resolve(self.rx.blocking_recv())
    }

    /// Waits asynchronously until the task finished.
    ///
    /// # Errors
    /// Same as [`TaskHandle::join`].
    pub async fn wait(self) -> Result<R, CallStackError> {
        resolve(self.rx.await)
    }
}

fn resolve<R>(
    received: Result<Result<R, Cow<'static, str>>, oneshot::error::RecvError>,
) -> Result<R, CallStackError> {
    match received {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(message)) => Err(CallStackError::TaskFailed { message, context: None }),
        Err(_) => Err(CallStackError::TaskFailed {
            message: "task was dropped before it completed".into(),
            context: None,
        }),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> Cow<'static, str> {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(*message)
    } else if let Ok(message) = payload.downcast::<String>() {
        Cow::Owned(*message)
    } else {
        Cow::Borrowed("task panicked")
    }
}

/// Shutdown flag plus in-flight task counter shared by executor
/// implementations.
#[derive(Debug, Default)]
pub struct Lifecycle {
    shutdown: AtomicBool,
    active: Mutex<usize>,
    idle: Condvar,
}

impl Lifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a task that is about to be handed to a worker. The task
    /// counts as running until the returned token drops.
    ///
    /// # Errors
    /// Returns [`CallStackError::Rejected`] after [`Lifecycle::shutdown`].
    pub fn begin(self: &Arc<Self>) -> Result<ActiveTask, CallStackError> {
        let mut active = self.active.lock();
        if self.is_shutdown() {
            return Err(CallStackError::Rejected {
                message: "executor is shut down".into(),
                context: None,
            });
        }
        *active += 1;
        drop(active);
        Ok(ActiveTask { lifecycle: Arc::clone(self) })
    }

    pub fn shutdown(&self) {
        let active = self.active.lock();
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            debug!(active = *active, "Executor shutting down");
        }
        self.idle.notify_all();
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.is_shutdown() && *self.active.lock() == 0
    }

    /// Number of tasks handed over and not yet finished.
    #[must_use]
    pub fn active(&self) -> usize {
        *self.active.lock()
    }

    pub fn await_termination(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut active = self.active.lock();
        while !(self.is_shutdown() && *active == 0) {
            match deadline {
                Some(deadline) => {
                    if self.idle.wait_until(&mut active, deadline).timed_out() {
                        return self.is_shutdown() && *active == 0;
                    }
                },
                None => self.idle.wait(&mut active),
            }
        }
        true
    }
}

/// Token for a task registered with [`Lifecycle::begin`].
#[must_use = "the task counts as finished once the token drops"]
#[derive(Debug)]
pub struct ActiveTask {
    lifecycle: Arc<Lifecycle>,
}

impl Drop for ActiveTask {
    fn drop(&mut self) {
        let mut active = self.lifecycle.active.lock();
        *active = active.saturating_sub(1);
        if *active == 0 {
            self.lifecycle.idle.notify_all();
        }
    }
}
