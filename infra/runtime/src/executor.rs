use crate::{RuntimeConfig, build_runtime_with_config};
use stackline_callstack::{CallStackError, Executor, Lifecycle, Task};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, trace};

/// [`Executor`] backed by a dedicated Tokio runtime.
///
/// Tasks run on the runtime's blocking pool, whose size is
/// [`RuntimeConfig::max_blocking_threads`]. Dropping the executor releases
/// the runtime without waiting for running tasks; call
/// [`Executor::shutdown`] and [`Executor::await_termination`] first to let
/// them finish.
#[derive(Debug)]
pub struct RuntimeExecutor {
    runtime: Option<Runtime>,
    handle: Handle,
    lifecycle: Arc<Lifecycle>,
    thread_name: String,
}

impl RuntimeExecutor {
    /// Builds the runtime described by `config`.
    ///
    /// # Errors
    /// Returns an [`anyhow::Error`] if the runtime cannot be created.
    pub fn new(config: &RuntimeConfig) -> crate::Result<Self> {
        let runtime = build_runtime_with_config(config)?;
        let handle = runtime.handle().clone();
        debug!(
            thread_name = %config.thread_name,
            max_blocking_threads = config.max_blocking_threads,
            "Runtime executor started"
        );
        Ok(Self {
            runtime: Some(runtime),
            handle,
            lifecycle: Arc::new(Lifecycle::new()),
            thread_name: config.thread_name.clone(),
        })
    }

    /// Executor whose tasks run one at a time, in submission order.
    ///
    /// # Errors
    /// Returns an [`anyhow::Error`] if the runtime cannot be created.
    pub fn single_thread() -> crate::Result<Self> {
        Self::new(&RuntimeConfig::single_thread())
    }

    /// Handle to the underlying runtime, e.g. for spawning async work next
    /// to the synchronous tasks.
    #[must_use]
    pub const fn handle(&self) -> &Handle {
        &self.handle
    }

    /// Number of tasks handed over and not yet finished.
    #[must_use]
    pub fn active(&self) -> usize {
        self.lifecycle.active()
    }
}

impl Executor for RuntimeExecutor {
    fn execute(&self, task: Task) -> Result<(), CallStackError> {
        let active = self.lifecycle.begin()?;
        let _detached = self.handle.spawn_blocking(move || {
            let _active = active;
            task();
        });
        trace!(thread_name = %self.thread_name, "Task queued on blocking pool");
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

impl Drop for RuntimeExecutor {
    fn drop(&mut self) {
        self.lifecycle.shutdown();
        if let Some(runtime) = self.runtime.take() {
            debug!(active = self.lifecycle.active(), "Releasing executor runtime");
            runtime.shutdown_background();
        }
    }
}
