//! Structured logging setup.
//!
//! [`Telemetry`] installs a `tracing` subscriber with an [`EnvFilter`]
//! (`RUST_LOG` first, then the configured level) and a formatting layer on
//! stderr, so command output on stdout stays machine readable.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Service identity and log level for the subscriber.
#[derive(Debug, Default)]
pub struct Telemetry {
    name: Option<&'static str>,
    version: Option<&'static str>,
    log_level: Option<String>,
}

impl Telemetry {
    /// Creates a new, empty [`Telemetry`] instance.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service name.
    #[must_use]
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the service version.
    #[must_use]
    pub const fn with_version(mut self, version: &'static str) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the log level filter used when `RUST_LOG` is not set.
    ///
    /// Accepts any valid [`EnvFilter`] directive string (e.g. `"debug"`,
    /// `"customrpc=debug"`).
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Installs the global subscriber.
    ///
    /// A second registration in the same process (e.g. across tests) is a
    /// no-op.
    pub fn register(self) {
        let fallback = self.log_level.as_deref().unwrap_or("info");
        let installed = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .is_ok();

        if installed {
            tracing::debug!(
                service = self.name.unwrap_or(env!("CARGO_PKG_NAME")),
                version = self.version.unwrap_or(env!("CARGO_PKG_VERSION")),
                "logging initialised"
            );
        }
    }
}
