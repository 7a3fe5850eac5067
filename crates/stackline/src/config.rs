use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use stackline_logger::LevelFilter;
use stackline_runtime::RuntimeConfig;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix for overrides, e.g. `STACKLINE__LOGGING__LEVEL=debug`.
pub const ENV_PREFIX: &str = "STACKLINE";

#[stackline_derive::stackline_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },

    #[error("Invalid config value{}: {message}", format_context(.context))]
    InvalidValue { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal config error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Top-level configuration of a stackline application.
#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StacklineConfig {
    pub logging: LoggingConfig,
    pub executor: ExecutorConfig,
}

/// Settings passed to the logger builder.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    pub filter: Option<String>,
    pub console: bool,
    /// Directory for rolling log files; no file output when unset.
    pub directory: Option<PathBuf>,
    pub max_files: usize,
    pub json: bool,
    /// Mirror entered tracing spans as call stack frames.
    pub span_frames: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "stackline".to_owned(),
            level: "info".to_owned(),
            filter: None,
            console: true,
            directory: None,
            max_files: 10,
            json: false,
            span_frames: false,
        }
    }
}

impl LoggingConfig {
    /// Parses [`LoggingConfig::level`].
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an unknown level name.
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.level.trim().parse().map_err(|_| ConfigError::InvalidValue {
            message: format!("unknown log level '{}'", self.level).into(),
            context: Some("logging.level".into()),
        })
    }
}

/// Which executor tasks run on.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutorKind {
    /// A fresh OS thread per task.
    #[default]
    Spawn,
    /// The blocking pool of a dedicated Tokio runtime.
    Runtime,
}

/// Runtime presets, see [`RuntimeConfig`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimePreset {
    #[default]
    Default,
    HighPerformance,
    MemoryEfficient,
    SingleThread,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub kind: ExecutorKind,
    pub preset: RuntimePreset,
    pub worker_threads: Option<usize>,
    pub max_blocking_threads: Option<usize>,
    pub stack_size: Option<usize>,
    pub thread_name: Option<String>,
}

impl ExecutorConfig {
    /// Starts from the preset and applies the explicit overrides.
    #[must_use]
    pub fn runtime_config(&self) -> RuntimeConfig {
        let mut config = match self.preset {
            RuntimePreset::Default => RuntimeConfig::default(),
            RuntimePreset::HighPerformance => RuntimeConfig::high_performance(),
            RuntimePreset::MemoryEfficient => RuntimeConfig::memory_efficient(),
            RuntimePreset::SingleThread => RuntimeConfig::single_thread(),
        };
        if let Some(threads) = self.worker_threads {
            config = config.with_worker_threads(threads);
        }
        if let Some(threads) = self.max_blocking_threads {
            config = config.with_max_blocking_threads(threads);
        }
        if let Some(size) = self.stack_size {
            config = config.with_stack_size(size);
        }
        if let Some(name) = &self.thread_name {
            config = config.with_thread_name(name.clone());
        }
        config
    }
}

/// Loads configuration from an optional file overlaid with environment
/// variables prefixed with `STACKLINE__`.
///
/// Nested keys use double underscores: `STACKLINE__EXECUTOR__KIND=runtime`
/// maps to `executor.kind`. The file format follows its extension. Without a
/// file every value not set in the environment keeps its default.
///
/// # Errors
/// Returns [`ConfigError::Config`] if the given file is missing or the
/// merged values do not match `T`.
///
/// # Example
/// ```rust
/// use stackline::config::{StacklineConfig, load_config};
///
/// let config: StacklineConfig = load_config(None::<&str>).unwrap_or_default();
/// assert_eq!(config.logging.name, "stackline");
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();
    if let Some(path) = path {
        let path = path.as_ref();
        info!("Loading config from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
