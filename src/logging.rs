//! Tracing subscriber setup for binaries and tests.
//!
//! The library only emits `tracing` events; installing a subscriber is left to the caller.
//! [`init_logging`] is the one the `profile-data` binary uses.

use tracing::Level;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level for everything outside this crate.
    pub level: Level,
    /// Level for `rust_data_profiling` events.
    pub crate_level: Level,
    /// Emit JSON lines instead of human-readable output.
    pub json_format: bool,
    /// Full filter directive, overriding both levels.
    pub env_filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            crate_level: Level::INFO,
            json_format: false,
            env_filter: None,
        }
    }
}

impl LogConfig {
    /// Debug output from this crate.
    pub fn verbose() -> Self {
        Self {
            crate_level: Level::DEBUG,
            ..Self::default()
        }
    }

    pub fn with_json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }

    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The filter directive this configuration stands for.
    pub fn env_filter(&self) -> String {
        match &self.env_filter {
            Some(filter) => filter.clone(),
            None => format!(
                "{},rust_data_profiling={},profile_data={}",
                self.level.as_str().to_lowercase(),
                self.crate_level.as_str().to_lowercase(),
                self.crate_level.as_str().to_lowercase()
            ),
        }
    }
}

/// Install a global subscriber. `RUST_LOG`, when set, takes precedence over `config`.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.env_filter()));

    let fmt_layer = if config.json_format {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .json()
            .boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::LogConfig;

    #[test]
    fn default_filter_raises_crate_level_only() {
        assert_eq!(
            LogConfig::default().env_filter(),
            "warn,rust_data_profiling=info,profile_data=info"
        );
        assert_eq!(LogConfig::verbose().crate_level, Level::DEBUG);
    }

    #[test]
    fn explicit_filter_wins() {
        let config = LogConfig::default().with_env_filter("trace").with_json_format(true);
        assert_eq!(config.env_filter(), "trace");
        assert!(config.json_format);
    }
}
