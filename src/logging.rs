//! Structured logging setup using the tracing crate.
//!
//! The library itself only emits `tracing` events. Applications embedding it
//! can install a subscriber with [`LoggingBuilder`], driven by
//! [`LoggingConfig`](crate::config::LoggingConfig).

use crate::config::{LogFormat, LogLevel, LoggingConfig};
use crate::error::{Error, Result};
use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Builder for constructing a logging layer.
#[derive(Debug, Clone, Default)]
pub struct LoggingBuilder {
    config: LoggingConfig,
}

impl LoggingBuilder {
    /// Create a new logging builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from an existing configuration.
    pub fn from_config(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Set the log level.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Set the log format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set ANSI colors.
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.config.ansi_colors = enabled;
        self
    }

    /// Set filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.filter = Some(filter.into());
        self
    }

    /// Build and install the global subscriber.
    ///
    /// Fails if a global subscriber is already set.
    pub fn init(self) -> Result<()> {
        let layer = self.build_layer::<Registry>();
        tracing_subscriber::registry()
            .with(layer)
            .try_init()
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Build a logging layer that can be composed with other layers.
    pub fn build_layer<S>(self) -> Box<dyn Layer<S> + Send + Sync + 'static>
    where
        S: Subscriber + for<'a> LookupSpan<'a> + Send + Sync,
    {
        let env_filter = self.build_filter();
        let base = tracing_subscriber::fmt::layer()
            .with_ansi(self.config.ansi_colors)
            .with_target(self.config.with_target);

        match self.config.format {
            LogFormat::Pretty => base.pretty().with_filter(env_filter).boxed(),
            LogFormat::Compact => base.compact().with_filter(env_filter).boxed(),
            LogFormat::Json => base
                .json()
                .with_current_span(true)
                .with_filter(env_filter)
                .boxed(),
            LogFormat::Full => base
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_filter(env_filter)
                .boxed(),
        }
    }

    fn build_filter(&self) -> EnvFilter {
        let default_filter = self.config.level.as_str();

        if let Some(ref filter) = self.config.filter {
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(filter))
                .unwrap_or_else(|_| EnvFilter::new(default_filter))
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
        }
    }
}

/// Install a compact subscriber at the given level.
pub fn init_with_level(level: LogLevel) -> Result<()> {
    LoggingBuilder::new().with_level(level).init()
}
