//! Facade crate for the call stack libraries.
//! Re-exports the call stack core, executors and logging, and adds the
//! layered configuration that ties them together in applications.
//! Keep this crate thin: it should compose other crates, not implement stack semantics.
//!
//! ## Usage
//! - Load a [`config::StacklineConfig`] with [`config::load_config`].
//! - Call [`setup::init_logger`] and [`setup::build_executor`] with its sections.
//! - Derive [`Descriptive`] with `#[descriptive(crate = stackline::callstack)]`
//!   when `stackline` is the only dependency.

pub mod config;
pub mod setup;

pub use stackline_callstack as callstack;
pub use stackline_callstack::{
    CallStack, CallStackError, CallStackErrorExt, Description, Descriptive, Executor,
    FrameGuard, NonDescriptive, SpawnExecutor, StackExecutor, TaskHandle,
};
pub use stackline_logger as logger;
pub use stackline_runtime as runtime;
pub use stackline_runtime::RuntimeExecutor;
