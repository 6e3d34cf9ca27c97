//! Logging configuration for the pipeline.
//!
//! Components log through `tracing` macros; this module only decides where
//! those events go. The binary calls [`setup::init_logging`] once at start-up.

/// Truncates a string to the maximum field length if needed.
///
/// Used when logging cell values or file contents that may be arbitrarily long.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    if value.len() <= max_length {
        value.to_string()
    } else {
        let mut end = max_length;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...(truncated)", &value[..end])
    }
}

/// Utilities for setting up structured logging.
pub mod setup {
    use std::path::PathBuf;
    use tracing::Level;

    /// Configuration for the pipeline's logging setup.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for dependencies
        pub level: Level,
        /// Log level for drift-guard components specifically
        pub crate_level: Level,
        /// Whether to use JSON output format on stdout
        pub json_format: bool,
        /// Directory receiving a per-run log file
        pub log_dir: Option<PathBuf>,
        /// File name of the per-run log file inside `log_dir`
        pub log_file_name: String,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: false,
                log_dir: None,
                log_file_name: default_log_file_name(),
                env_filter: None,
            }
        }
    }

    /// `<timestamp>.log`, one file per pipeline run.
    fn default_log_file_name() -> String {
        format!("{}.log", chrono::Local::now().format("%m_%d_%Y_%H_%M_%S"))
    }

    impl LoggingConfig {
        /// Creates a configuration for batch runs: JSON on stdout plus a run log.
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                crate_level: Level::INFO,
                json_format: true,
                log_dir: Some(PathBuf::from("logs")),
                log_file_name: default_log_file_name(),
                env_filter: None,
            }
        }

        /// Creates a configuration for development use.
        pub fn development() -> Self {
            Self {
                level: Level::INFO,
                crate_level: Level::DEBUG,
                json_format: false,
                log_dir: None,
                log_file_name: default_log_file_name(),
                env_filter: None,
            }
        }

        /// Sets the log level for dependencies.
        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        /// Sets the log level for drift-guard components.
        pub fn with_crate_level(mut self, level: Level) -> Self {
            self.crate_level = level;
            self
        }

        /// Sets whether to use JSON output format.
        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        /// Writes a copy of every event to `dir/<log_file_name>`.
        pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
            self.log_dir = Some(dir.into());
            self
        }

        /// Sets a custom environment filter.
        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter string.
        pub fn env_filter(&self) -> String {
            if let Some(ref filter) = self.env_filter {
                filter.clone()
            } else {
                format!(
                    "{},drift_guard={}",
                    self.level.as_str().to_lowercase(),
                    self.crate_level.as_str().to_lowercase()
                )
            }
        }

        /// Full path of the run log file, if file logging is enabled.
        pub fn log_file_path(&self) -> Option<PathBuf> {
            self.log_dir
                .as_ref()
                .map(|dir| dir.join(&self.log_file_name))
        }
    }

    /// Initializes logging.
    ///
    /// `RUST_LOG` takes precedence over the configured filter. When a log
    /// directory is configured it is created and a plain-text copy of every
    /// event is appended to the run log file.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use drift_guard::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        let file_layer = match &config.log_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let appender = tracing_appender::rolling::never(dir, &config.log_file_name);
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(appender)
                        .boxed(),
                )
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(file_layer)
            .try_init()?;

        Ok(())
    }
}
