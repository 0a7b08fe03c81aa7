//! Structured logging setup via `tracing-subscriber`, matching
//! `LoggingConfig` (`SPEC_FULL.md` §2.1/§2.3).

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use warden_domain::error::{Error, Result};

use crate::config::LoggingConfig;

/// Initializes the global `tracing` subscriber from `config`.
///
/// Returns a [`WorkerGuard`] that must be held for the lifetime of the
/// process when `config.rolling_file` is set, since the non-blocking
/// file appender flushes on drop.
///
/// # Errors
/// Returns [`Error::Config`] if `config.level` is not a valid env-filter
/// directive.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::Config(format!("invalid logging level directive {:?}: {e}", config.level)))?;

    let (file_layer, guard) = match &config.rolling_file {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "warden.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = build_fmt_layer(config.format.as_str(), non_blocking, false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stdout_layer = build_fmt_layer(config.format.as_str(), std::io::stdout, true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("failed to install tracing subscriber: {e}")))?;

    Ok(guard)
}

fn build_fmt_layer<S, W>(format: &str, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    if format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_ansi(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_filter_directive() {
        let config = LoggingConfig {
            level: "not a valid directive!!".to_string(),
            format: "pretty".to_string(),
            rolling_file: None,
        };
        assert!(init(&config).is_err());
    }
}
