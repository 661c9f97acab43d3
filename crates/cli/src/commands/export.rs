use std::path::PathBuf;

use anyhow::{Context, Result};
use relabel_core::pipeline::ExportRun;
use relabel_core::report::Console;
use relabel_core::server::HttpAnalysisServer;

use crate::{load_config, resolve_workers};

/// Command-line overrides for the export pipeline.
#[derive(Debug, Default, Clone)]
pub struct ExportOptions {
    pub server_url: Option<String>,
    /// Raw worker-count argument; validated leniently.
    pub workers: Option<String>,
    pub batch_size: Option<usize>,
    pub output_root: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

/// Decompile every function and save each one to its own file.
pub fn export_command(options: ExportOptions) -> Result<()> {
    let mut config = load_config(options.config.as_deref())?;
    if let Some(url) = options.server_url {
        config.server_url = url;
    }
    config.export.workers = resolve_workers(options.workers.as_deref(), config.export.workers);
    if let Some(batch_size) = options.batch_size {
        config.export.batch_size = batch_size;
    }
    if let Some(root) = options.output_root {
        config.export.output_root = root;
    }

    let server = HttpAnalysisServer::new(&config.server_url)
        .with_context(|| format!("Failed to create client for {}", config.server_url))?;
    let console = Console::stdout();
    let workers = config.export.workers;

    let run = ExportRun::new(&server, &console, config.export)
        .context("Failed to prepare export run")?;
    console.line("Exporting decompiled code for all functions");
    console.line(format!("Output directory: {}", run.output_dir().display()));
    console.line(format!("Using {workers} worker threads"));

    run.run().context("Export run failed")?;
    Ok(())
}
