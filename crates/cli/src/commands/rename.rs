use std::path::PathBuf;

use anyhow::{Context, Result};
use relabel_core::naming::ChatNamingService;
use relabel_core::pipeline::RenameRun;
use relabel_core::report::Console;
use relabel_core::server::HttpAnalysisServer;

use crate::load_config;

/// Command-line overrides for the rename pipeline.
#[derive(Debug, Default, Clone)]
pub struct RenameOptions {
    pub server_url: Option<String>,
    pub pattern: Option<String>,
    pub batch_size: Option<usize>,
    pub delay: Option<f64>,
    pub config: Option<PathBuf>,
}

/// Name every function matching the pattern and rename it on the server.
///
/// Fails (non-zero exit) only when the circuit breaker trips or the run
/// cannot be set up.
pub fn rename_command(options: RenameOptions) -> Result<()> {
    let mut config = load_config(options.config.as_deref())?;
    if let Some(url) = options.server_url {
        config.server_url = url;
    }
    if let Some(pattern) = options.pattern {
        config.rename.pattern = pattern;
    }
    if let Some(batch_size) = options.batch_size {
        config.rename.batch_size = batch_size;
    }
    if let Some(delay) = options.delay {
        config.rename.delay_secs = delay;
    }

    let server = HttpAnalysisServer::new(&config.server_url)
        .with_context(|| format!("Failed to create client for {}", config.server_url))?;
    let naming = ChatNamingService::new(config.naming.clone())
        .context("Failed to create naming service client")?;
    let console = Console::stdout();

    console.line(format!("Analysis server: {}", server.base_url()));
    console.line(format!("Model: {}", config.naming.model));
    console.line(format!("- Pattern: {}", config.rename.pattern));
    console.line(format!("- Batch size: {}", config.rename.batch_size));
    console.line(format!("- Delay: {}s", config.rename.delay_secs));
    console.line("-".repeat(50));

    let mut run = RenameRun::new(&server, &naming, &console, config.rename);
    run.run().context("Rename run aborted")?;
    Ok(())
}
