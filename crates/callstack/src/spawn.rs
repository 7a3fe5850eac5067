use crate::error::{CallStackError, CallStackErrorExt};
use crate::executor::{Executor, Lifecycle, Task};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::trace;

const DEFAULT_THREAD_NAME: &str = "stackline-task";

/// Runs every task on a fresh, named OS thread.
///
/// Clones share the same lifecycle: shutting down one clone shuts down all.
#[derive(Debug, Clone)]
pub struct SpawnExecutor {
    lifecycle: Arc<Lifecycle>,
    thread_name: Arc<str>,
    stack_size: Option<usize>,
}

impl Default for SpawnExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_THREAD_NAME)
    }
}

impl SpawnExecutor {
    #[must_use]
    pub fn new(thread_name: impl Into<Arc<str>>) -> Self {
        let thread_name = thread_name.into();
        let thread_name =
            if thread_name.trim().is_empty() { Arc::from(DEFAULT_THREAD_NAME) } else { thread_name };
        Self { lifecycle: Arc::new(Lifecycle::new()), thread_name, stack_size: None }
    }

    #[must_use = "Customize the stack size of task threads"]
    pub const fn with_stack_size(mut self, bytes: usize) -> Self {
        self.stack_size = Some(bytes);
        self
    }

    /// Number of tasks currently running.
    #[must_use]
    pub fn active(&self) -> usize {
        self.lifecycle.active()
    }
}

impl Executor for SpawnExecutor {
    fn execute(&self, task: Task) -> Result<(), CallStackError> {
        let active = self.lifecycle.begin()?;

        let mut builder = thread::Builder::new().name(self.thread_name.to_string());
        if let Some(bytes) = self.stack_size {
            builder = builder.stack_size(bytes);
        }

        let _detached = builder
            .spawn(move || {
                let _active = active;
                task();
            })
            .context("Spawning task thread")?;

        trace!(thread = %self.thread_name, "Spawned task thread");
        Ok(())
    }

    fn shutdown(&self) {
        self.lifecycle.shutdown();
    }

    fn is_shutdown(&self) -> bool {
        self.lifecycle.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.lifecycle.is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.lifecycle.await_termination(timeout)
    }
}
