//! # Runtime
//!
//! Tokio runtimes configured for call stack hand-off.
//!
//! [`RuntimeExecutor`] implements [`stackline_callstack::Executor`] on top of a
//! dedicated runtime. Tasks are synchronous and bound to the thread they run
//! on, so they execute on the runtime's blocking pool; wrap the executor with
//! [`CallStack::wrap_executor`](stackline_callstack::CallStack::wrap_executor)
//! to give every task a copy of the submitting stack.
//!
//! ## Profiles
//! * **High Performance**: more blocking threads, larger stacks and longer keep-alive.
//! * **Memory Efficient**: fewer threads and smaller stacks.
//! * **Single Thread**: one worker that runs tasks one after another, in submission order.
//!
//! ## Example
//!
//! ```rust
//! use stackline_callstack::{CallStack, Description, Executor};
//! use stackline_runtime::{RuntimeConfig, RuntimeExecutor};
//!
//! # fn main() -> anyhow::Result<()> {
//! let stack = CallStack::empty();
//! stack.push(Description::new("First"))?;
//!
//! let executor = stack.wrap_executor(RuntimeExecutor::new(&RuntimeConfig::single_thread())?);
//! let top = executor.submit(|| CallStack::current().pop())?.join()??;
//! assert_eq!(top.as_str(), "First");
//! # Ok(())
//! # }
//! ```

mod executor;

pub use anyhow::Result;
pub use executor::RuntimeExecutor;

use anyhow::anyhow;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// The default number of worker threads if detection fails.
const DEFAULT_WORKER_THREADS: usize = 4;
/// Upper bound for both async workers and blocking threads.
const MAX_THREADS: usize = 1024;
/// Default size of the blocking pool that runs submitted tasks.
const DEFAULT_BLOCKING_THREADS: usize = 64;
/// The default stack size for threads (3 `MiB`).
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
/// Minimum allowed stack size (1 `MiB`).
const MIN_STACK_SIZE: usize = 1024 * 1024;
/// Maximum allowed stack size (16 `MiB`).
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
/// How long an idle thread stays alive.
const THREAD_KEEP_ALIVE: Duration = Duration::from_secs(60);
const DEFAULT_THREAD_NAME: &str = "stackline-worker";

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

/// Detects the optimal number of worker threads based on environment variables or hardware.
fn get_worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= MAX_THREADS)
            .unwrap_or_else(|| {
                available_parallelism()
                    .map(std::num::NonZero::get)
                    .unwrap_or(DEFAULT_WORKER_THREADS)
            })
    })
}

fn validate_stack_size(stack_size: usize) -> usize {
    stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE)
}

fn validate_thread_name(name: String) -> String {
    if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name }
}

fn normalize_config(config: &RuntimeConfig) -> RuntimeConfig {
    RuntimeConfig {
        worker_threads: config.worker_threads.clamp(1, MAX_THREADS),
        max_blocking_threads: config.max_blocking_threads.clamp(1, MAX_THREADS),
        stack_size: validate_stack_size(config.stack_size),
        thread_name: validate_thread_name(config.thread_name.clone()),
        thread_keep_alive: config.thread_keep_alive,
    }
}

/// Configuration for the Tokio runtime behind a [`RuntimeExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    /// Size of the blocking pool; bounds how many tasks run at once.
    pub max_blocking_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    pub thread_keep_alive: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: get_worker_threads(),
            max_blocking_threads: DEFAULT_BLOCKING_THREADS,
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }
}

impl RuntimeConfig {
    /// Preset for throughput-heavy services.
    #[must_use = "Use this configuration for high-throughput executors"]
    pub fn high_performance() -> Self {
        Self {
            worker_threads: get_worker_threads(),
            max_blocking_threads: 256,
            stack_size: 4 * 1024 * 1024,
            thread_name: "stackline-hp".to_owned(),
            thread_keep_alive: Duration::from_secs(300),
        }
    }

    /// Preset for environments where memory footprint matters.
    #[must_use = "Use this configuration for low-footprint executors"]
    pub fn memory_efficient() -> Self {
        Self {
            worker_threads: (get_worker_threads() / 2).max(1),
            max_blocking_threads: 8,
            stack_size: 2 * 1024 * 1024,
            thread_name: "stackline-mem".to_owned(),
            thread_keep_alive: Duration::from_secs(30),
        }
    }

    /// Preset with a single task thread: tasks run one at a time, in
    /// submission order.
    #[must_use = "Use this configuration for sequential executors"]
    pub fn single_thread() -> Self {
        Self {
            worker_threads: 1,
            max_blocking_threads: 1,
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: "stackline-single".to_owned(),
            thread_keep_alive: THREAD_KEEP_ALIVE,
        }
    }

    #[must_use = "Customize the number of worker threads for the runtime"]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_THREADS);
        self
    }

    #[must_use = "Customize how many tasks may run at once"]
    pub fn with_max_blocking_threads(mut self, threads: usize) -> Self {
        self.max_blocking_threads = threads.clamp(1, MAX_THREADS);
        self
    }

    #[must_use = "Customize the stack size for worker threads"]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = validate_stack_size(size);
        self
    }

    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = validate_thread_name(name.into());
        self
    }

    #[must_use = "Customize how long idle threads stay alive"]
    pub const fn with_thread_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.thread_keep_alive = keep_alive;
        self
    }
}

/// Creates a new Tokio runtime with the default configuration and a custom
/// stack size, clamped to 1-16 `MiB`.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the Tokio runtime cannot be created, typically due to
/// insufficient system resources or OS-level limitations.
pub fn build_runtime(stack_size: usize) -> Result<Runtime> {
    build_runtime_with_config(&RuntimeConfig::default().with_stack_size(stack_size))
}

/// Creates a new multi-threaded Tokio runtime from `config`.
///
/// Out-of-range values are clamped before the runtime is built. All Tokio
/// drivers (I/O, time) are enabled.
///
/// # Errors
///
/// Returns an [`anyhow::Error`] if the Tokio runtime cannot be created, e.g.
/// when the OS refuses to create threads.
///
/// # Examples
///
/// ```rust
/// use stackline_runtime::{build_runtime_with_config, RuntimeConfig};
///
/// let config = RuntimeConfig::memory_efficient().with_thread_name("custom-worker");
/// let runtime = build_runtime_with_config(&config)?;
/// runtime.block_on(async {});
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = normalize_config(config);
    debug!(config = ?config, "Building tokio runtime");

    let mut builder = Builder::new_multi_thread();
    builder
        .worker_threads(config.worker_threads)
        .max_blocking_threads(config.max_blocking_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive);

    builder.enable_all();

    builder.build().map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_count_validation() {
        let config = RuntimeConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, 1);

        let config = RuntimeConfig::default().with_worker_threads(2000);
        assert_eq!(config.worker_threads, MAX_THREADS);

        let config = RuntimeConfig::default().with_max_blocking_threads(0);
        assert_eq!(config.max_blocking_threads, 1);
    }

    #[test]
    fn test_stack_size_validation() {
        let config = RuntimeConfig::default().with_stack_size(100);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);

        let config = RuntimeConfig::default().with_stack_size(100 * 1024 * 1024);
        assert_eq!(config.stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn test_blank_thread_name_falls_back() {
        let config = RuntimeConfig::default().with_thread_name("   ");
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn test_normalize_clamps_public_fields() {
        let raw = RuntimeConfig {
            worker_threads: 0,
            max_blocking_threads: 0,
            stack_size: 0,
            thread_name: String::new(),
            thread_keep_alive: Duration::ZERO,
        };
        let config = normalize_config(&raw);
        assert_eq!(config.worker_threads, 1);
        assert_eq!(config.max_blocking_threads, 1);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn test_single_thread_preset() {
        let config = RuntimeConfig::single_thread();
        assert_eq!(config.worker_threads, 1);
        assert_eq!(config.max_blocking_threads, 1);
    }
}
