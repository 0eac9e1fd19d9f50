//! Structured logging setup.

use crate::config::{LogFormat, LoggingConfig};
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<bool> = OnceLock::new();

/// Installs the global tracing subscriber described by `config`.
///
/// Only the first call has any effect. Returns true if this process's
/// subscriber was installed by taskflow, false if another one was already
/// set.
pub fn init_logging(config: &LoggingConfig) -> bool {
    *LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|err| {
            eprintln!("Invalid log filter '{}': {err}; falling back to 'info'", config.filter);
            EnvFilter::new("info")
        });

        let layer = match config.format {
            LogFormat::Pretty => fmt::layer()
                .with_target(config.with_target)
                .with_thread_ids(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .json()
                .with_target(config.with_target)
                .with_thread_ids(true)
                .with_filter(filter)
                .boxed(),
        };

        // Another subscriber may already be installed by the host.
        let installed = tracing_subscriber::registry().with(layer).try_init().is_ok();
        if installed {
            tracing::debug!(
                filter = %config.filter,
                format = %config.format,
                "Initialized taskflow logging"
            );
        } else {
            tracing::debug!("Global tracing subscriber already set, keeping it");
        }
        installed
    })
}
