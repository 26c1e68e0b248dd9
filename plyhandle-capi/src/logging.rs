//! Opt-in log output for hosts embedding the library.

use tracing_subscriber::EnvFilter;

/// Logging configuration.
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: impl Into<String>) -> Self {
        Self { level: level.into() }
    }

    /// Install a global fmt subscriber writing to stderr.
    ///
    /// `RUST_LOG` takes precedence over `level`. Returns false when a global
    /// subscriber is already installed.
    pub fn try_init(&self) -> bool {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level)),
            )
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    }
}
