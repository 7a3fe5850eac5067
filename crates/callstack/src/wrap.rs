use crate::call_stack::CallStack;
use crate::error::CallStackError;
use crate::executor::{Executor, Task};
use std::time::Duration;
use tracing::{trace, warn};

/// Executor that installs a copy of a call stack on the worker thread
/// before running each task.
///
/// The copy is taken when the task is submitted, so frames pushed onto the
/// source stack afterwards are not visible to the task, and frames the task
/// pushes never reach the source. Lifecycle calls go to the wrapped executor.
///
/// Created with [`CallStack::wrap_executor`].
#[derive(Debug, Clone)]
pub struct StackExecutor<E> {
    stack: CallStack,
    inner: E,
}

impl<E> StackExecutor<E> {
    pub(crate) const fn new(stack: CallStack, inner: E) -> Self {
        Self { stack, inner }
    }

    /// The stack copied into every task.
    #[must_use]
    pub const fn stack(&self) -> &CallStack {
        &self.stack
    }

    #[must_use]
    pub const fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Executor> Executor for StackExecutor<E> {
    fn execute(&self, task: Task) -> Result<(), CallStackError> {
        let split = self.stack.split();
        trace!(source = self.stack.id(), split = split.id(), "Handing call stack copy to executor");

        self.inner.execute(Box::new(move || {
            if let Err(err) = split.install() {
                warn!(stack = split.id(), kind = err.kind(), %err, "Failed to install call stack on worker");
            }
            task();
        }))
    }

    fn shutdown(&self) {
        self.inner.shutdown();
    }

    fn is_shutdown(&self) -> bool {
        self.inner.is_shutdown()
    }

    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }

    fn await_termination(&self, timeout: Duration) -> bool {
        self.inner.await_termination(timeout)
    }
}
