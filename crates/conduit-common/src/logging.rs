//! ---
//! conduit_section: "01-core-functionality"
//! conduit_subsection: "module"
//! conduit_type: "source"
//! conduit_scope: "code"
//! conduit_description: "Shared primitives and utilities for the dispatching core."
//! conduit_version: "v0.0.0-prealpha"
//! conduit_owner: "tbd"
//! ---
use std::path::PathBuf;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::daily;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::registry::Registry;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Filter override read before `RUST_LOG`.
pub const LOG_ENV: &str = "CONDUIT_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Writer guards must outlive the subscriber or buffered lines are lost.
static GUARDS: OnceCell<Vec<WorkerGuard>> = OnceCell::new();

/// Stdout format of a runtime; the rolling file is always JSON.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    StructuredJson,
    Pretty,
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global tracing subscriber for `service_name`.
///
/// The filter comes from `CONDUIT_LOG`, then `RUST_LOG`, then `info`. Envelope
/// traffic is logged at `debug`, so `CONDUIT_LOG=debug` shows every send and
/// receive. When `config.file` is set, a daily rolling JSON file named
/// `<prefix>-<service>.log` is written under `config.directory`.
///
/// Only the first call installs a subscriber; later calls are no-ops apart
/// from creating the log directory.
pub fn init_tracing(service_name: &str, config: &LoggingConfig) -> Result<()> {
    let mut guards = Vec::with_capacity(2);

    let (stdout, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(stdout_guard);
    let mut layers: Vec<BoxedLayer> = vec![stdout_layer(config.format, stdout)];

    if config.file {
        std::fs::create_dir_all(&config.directory).with_context(|| {
            format!("unable to create log directory {}", config.directory.display())
        })?;
        let prefix = config.file_prefix.as_deref().unwrap_or("conduit");
        let appender = daily(&config.directory, format!("{prefix}-{service_name}.log"));
        let (file, file_guard) = tracing_appender::non_blocking(appender);
        guards.push(file_guard);
        layers.push(
            fmt::layer()
                .with_timer(fmt::time::UtcTime::rfc_3339())
                .json()
                .with_writer(file)
                .boxed(),
        );
    }

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(filter_from(std::env::var(LOG_ENV).ok()))
        .try_init()
        .is_ok();
    if installed {
        let _ = GUARDS.set(guards);
        let log_dir: Option<PathBuf> = config.file.then(|| config.directory.clone());
        info!(
            service = %service_name,
            format = ?config.format,
            log_dir = ?log_dir,
            "tracing initialised"
        );
    }
    Ok(())
}

fn stdout_layer(format: LogFormat, writer: NonBlocking) -> BoxedLayer {
    match format {
        LogFormat::StructuredJson => fmt::layer()
            .with_target(false)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .json()
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(writer)
            .boxed(),
    }
}

/// Filter for an optional `CONDUIT_LOG` directive.
fn filter_from(directive: Option<String>) -> EnvFilter {
    match directive {
        Some(directive) if !directive.trim().is_empty() => EnvFilter::try_new(&directive)
            .unwrap_or_else(|err| {
                eprintln!(
                    "invalid {LOG_ENV} directive `{directive}` ({err}); using {DEFAULT_DIRECTIVE}"
                );
                EnvFilter::new(DEFAULT_DIRECTIVE)
            }),
        _ => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directive_is_used() {
        let filter = filter_from(Some("debug,conduit_dispatch=trace".to_owned()));
        assert!(filter.to_string().contains("conduit_dispatch=trace"));
    }

    #[test]
    fn broken_directive_falls_back() {
        let filter = filter_from(Some("conduit_dispatch=verbose".to_owned()));
        assert_eq!(filter.to_string(), DEFAULT_DIRECTIVE);
    }
}
