//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for the course planner.
//!
//! * Console output is compact and colored, or JSON when [`LoggerBuilder::json`] is set.
//! * File output goes through a non-blocking rolling appender; keep the returned
//!   [`Logger`] alive so buffered lines are flushed on shutdown.
//! * Filtering starts from [`LoggerBuilder::level`], then `RUST_LOG`, unless an explicit
//!   directive is given with [`LoggerBuilder::env_filter`].
//!
//! ## Example
//!
//! ```rust
//! # use cplan_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder()
//!     .name("cplan-server")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use private::Sealed;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    json: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            json: false,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            env_filter: None,
        }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}

/// Builder for the global tracing subscriber. A name is required before [`init`](LoggerBuilder::init).
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName> {
    config: LoggerConfig,
    name: N,
}

impl LoggerBuilder<NoName> {
    /// Sets the logger name, also used as the rolling file prefix.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { config: self.config, name: WithName(name.into()) }
    }
}

impl<N: Sealed> LoggerBuilder<N> {
    /// Minimum level emitted when no directive overrides it.
    #[must_use = "logger builders do nothing until .init()"]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Explicit filter directive (e.g., `cplan_plans=debug,surrealdb=warn`).
    ///
    /// Takes precedence over `RUST_LOG`. Invalid directives fail [`LoggerBuilder::init`].
    #[must_use = "logger builders do nothing until .init()"]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use = "logger builders do nothing until .init()"]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Emits JSON lines instead of the compact human format.
    #[must_use = "logger builders do nothing until .init()"]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }

    /// Writes rolling log files into `path`.
    #[must_use = "logger builders do nothing until .init()"]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = Some(path.into());
        self
    }

    #[must_use = "logger builders do nothing until .init()"]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    /// Number of rotated files kept on disk.
    #[must_use = "logger builders do nothing until .init()"]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }
}

impl LoggerBuilder<WithName> {
    /// Consumes the builder and installs the global subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, `max_files == 0`, an invalid
    ///   filter directive or when no output is enabled.
    /// * [`LoggerError::Appender`] / [`LoggerError::Internal`] if the log directory cannot be used.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let LoggerBuilder { config, name: WithName(name) } = self;
        validate_config(&config, &name)?;

        let filter = build_env_filter(&config)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if config.console {
            let console = layer().with_ansi(!config.json);
            layers.push(if config.json { console.json().boxed() } else { console.compact().boxed() });
        }

        let guard = match &config.path {
            Some(path) => {
                let (file_layer, guard) = file_layer(&config, path.clone(), &name)?;
                layers.push(file_layer);
                Some(guard)
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(layers)
            .with(filter)
            .try_init()
            .context("Installing global subscriber")?;

        tracing::debug!(logger = %name, file = guard.is_some(), "Logging initialized");
        Ok(Logger { guard })
    }
}

/// Handle to the installed logging system.
///
/// Holds the background writer guard when file output is enabled.
#[must_use = "dropping the handle stops the file writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    #[must_use = "logger builders do nothing until .init()"]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig::default(), name: NoName }
    }

    /// The non-blocking writer guard, present only with file output.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Flushing log files");
        }
    }
}

fn file_layer(
    config: &LoggerConfig,
    path: PathBuf,
    name: &str,
) -> Result<(BoxedLayer, WorkerGuard), LoggerError> {
    fs::create_dir_all(&path).map_err(|e| LoggerError::Internal {
        message: e.to_string().into(),
        context: Some(format!("Creating {}", path.display()).into()),
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(config.rotation.clone())
        .filename_prefix(name)
        .filename_suffix(LOG_FILE_SUFFIX)
        .max_log_files(config.max_files)
        .build(path)?;

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = layer().with_writer(writer).with_ansi(false);
    let boxed = if config.json { file.json().boxed() } else { file.boxed() };

    Ok((boxed, guard))
}

fn validate_config(config: &LoggerConfig, name: &str) -> Result<(), LoggerError> {
    let problem = if name.trim().is_empty() {
        "logger name is blank"
    } else if config.max_files == 0 {
        "at least one rotated file must be kept"
    } else if !config.console && config.path.is_none() {
        "neither console nor file output is enabled"
    } else {
        return Ok(());
    };

    Err(LoggerError::InvalidConfiguration { message: problem.into(), context: None })
}

fn build_env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    let Some(directive) = &config.env_filter else {
        return Ok(builder.from_env_lossy());
    };
    builder.parse(directive).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("bad filter directive '{directive}': {e}").into(),
        context: None,
    })
}
