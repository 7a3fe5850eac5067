//! Turns configuration sections into running components.

use crate::config::{ExecutorConfig, ExecutorKind, LoggingConfig};
use anyhow::Result;
use stackline_callstack::{Executor, SpawnExecutor};
use stackline_logger::Logger;
use stackline_runtime::RuntimeExecutor;
use std::sync::Arc;
use tracing::debug;

/// Installs the global tracing subscriber described by `config`.
///
/// # Errors
/// Fails on an unknown level, an invalid filter, an unusable log directory,
/// or when a global subscriber is already installed.
pub fn init_logger(config: &LoggingConfig) -> Result<Logger> {
    let builder = Logger::builder()
        .name(config.name.clone())
        .level(config.level_filter()?)
        .console(config.console)
        .span_frames(config.span_frames);
    let builder = match &config.filter {
        Some(filter) => builder.env_filter(filter.clone()),
        None => builder,
    };

    let logger = match &config.directory {
        Some(directory) => {
            let builder = builder.path(directory).max_files(config.max_files);
            if config.json { builder.json().init()? } else { builder.init()? }
        },
        None => builder.init()?,
    };
    Ok(logger)
}

/// Builds the executor described by `config`.
///
/// # Errors
/// Fails if a Tokio runtime is requested and cannot be created.
pub fn build_executor(config: &ExecutorConfig) -> Result<Arc<dyn Executor>> {
    let executor: Arc<dyn Executor> = match config.kind {
        ExecutorKind::Spawn => {
            let runtime = config.runtime_config();
            let spawn = SpawnExecutor::new(runtime.thread_name);
            let spawn = match config.stack_size {
                Some(_) => spawn.with_stack_size(runtime.stack_size),
                None => spawn,
            };
            Arc::new(spawn)
        },
        ExecutorKind::Runtime => Arc::new(RuntimeExecutor::new(&config.runtime_config())?),
    };
    debug!(kind = ?config.kind, "Executor ready");
    Ok(executor)
}
