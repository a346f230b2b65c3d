//! Logging setup for the image analyzer
//!
//! The analyzer emits `tracing` events and spans; this module installs a subscriber
//! that prints them.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable that overrides the level passed to [`init_logging`].
pub const LOG_ENV_VAR: &str = "IMAGE_ANALYZER_LOG";

/// Log levels supported by the analyzer.
///
/// These map to the tracing level hierarchy: ERROR, WARN, INFO, DEBUG, TRACE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Error logs only - failed analyses
    Error,
    /// Warning and error logs
    Warn,
    /// Info, warning, and error logs - one line per analysis
    Info,
    /// Debug, info, warning, and error logs - request and response details
    Debug,
    /// Everything, including the JSON text handed to the structured parser
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }

    /// The `EnvFilter` directive enabling this level for the crate.
    pub fn directive(self) -> String {
        format!("image_analyzer={}", self.to_tracing_level())
    }
}

/// Initialize logging with a specific log level.
///
/// Call once at the start of your application.
///
/// ```no_run
/// use image_analyzer::logging::{init_logging, LogLevel};
///
/// init_logging(LogLevel::Info);
/// tracing::info!("Application starting");
/// ```
///
/// Setting `IMAGE_ANALYZER_LOG` takes precedence over `level`:
///
/// ```bash
/// IMAGE_ANALYZER_LOG=debug cargo run --example analyze_image -- cat.png
/// ```
pub fn init_logging(level: LogLevel) {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level.directive()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    tracing::info!("Image analyzer logging initialized at level: {:?}", level);
}

/// Initialize logging with a custom filter string.
///
/// ```no_run
/// use image_analyzer::logging::init_logging_with_filter;
///
/// init_logging_with_filter("image_analyzer=debug,image_analyzer::backend::utils=trace");
/// ```
pub fn init_logging_with_filter(filter: &str) {
    let (env_filter, invalid) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, false),
        Err(_) => (EnvFilter::new(LogLevel::Info.directive()), true),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter)
        .init();

    if invalid {
        tracing::warn!("Invalid filter string: {}, using default (info)", filter);
    }
    tracing::info!("Image analyzer logging initialized with custom filter: {}", filter);
}
