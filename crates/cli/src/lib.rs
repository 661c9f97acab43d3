pub mod commands;

use std::path::Path;

use anyhow::Result;
use relabel_core::config::{load_run_config, RunConfig};
use relabel_core::pipeline::export::DEFAULT_WORKERS;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber. Diagnostics go to stderr so stdout
/// carries only the progress report.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Defaults, then the optional config file, then environment variables.
pub fn load_config(path: Option<&Path>) -> Result<RunConfig> {
    let config = match path {
        Some(p) => load_run_config(p)?,
        None => RunConfig::default(),
    };
    Ok(config.with_env())
}

/// Parse the worker-count argument. Anything that is not a positive integer
/// falls back to `default` with a warning.
pub fn parse_worker_count(raw: Option<&str>, default: usize) -> usize {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            warn!(value = raw, default, "worker count must be a positive integer; using default");
            default
        }
    }
}

/// Worker count from the CLI argument, or the configured/default value.
pub fn resolve_workers(raw: Option<&str>, configured: usize) -> usize {
    let fallback = if configured > 0 { configured } else { DEFAULT_WORKERS };
    parse_worker_count(raw, fallback)
}
