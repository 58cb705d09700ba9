//! Tracing setup for scopeboard.
//!
//! Call [`init_tracing`] once at startup. The `RUST_LOG` environment
//! variable overrides the configured default level.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    /// Failed to set the global subscriber.
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    /// Failed to parse an env filter directive.
    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Output format for log messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Compact single-line format (default).
    #[default]
    Compact,
    /// JSON format for structured log collection.
    Json,
}

/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// The default log level when `RUST_LOG` is not set.
    pub default_level: Level,
    /// Output format for log messages.
    pub output_format: TracingOutputFormat,
    /// Whether to include file/line information in logs.
    pub include_location: bool,
    /// Whether to include span enter/close events.
    pub include_span_events: bool,
    /// Custom env filter directive (overrides `default_level` if set).
    pub env_filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: Level::INFO,
            output_format: TracingOutputFormat::Compact,
            include_location: false,
            include_span_events: false,
            env_filter: None,
        }
    }
}

impl TracingConfig {
    /// Config for normal server operation.
    #[must_use]
    pub fn server() -> Self {
        Self::default()
    }

    /// Config for debug mode: verbose, with source locations.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            default_level: Level::DEBUG,
            include_location: true,
            ..Default::default()
        }
    }

    /// Set the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Set a custom env filter directive.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }
}

/// Initializes the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the global subscriber has already been set or if
/// the env filter directive is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let env_filter = if let Some(ref filter) = config.env_filter {
        EnvFilter::try_new(filter)?
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("scopeboard={}", config.default_level)))
    };

    let span_events = if config.include_span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.output_format {
        TracingOutputFormat::Compact => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .compact()
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_span_events(span_events),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
        TracingOutputFormat::Json => {
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                fmt::layer()
                    .json()
                    .with_file(config.include_location)
                    .with_line_number(config.include_location)
                    .with_span_events(span_events),
            );
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
