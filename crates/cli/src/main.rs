use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ghidra_relabel::commands::{export_command, rename_command, ExportOptions, RenameOptions};
use ghidra_relabel::init_tracing;

/// Bulk relabel and export functions held by a remote Ghidra analysis server.
///
/// This CLI is a thin wrapper around `relabel-core` (exposed in code as `relabel_core`).
/// All substantive logic lives in the library so it can be tested thoroughly.
#[derive(Parser, Debug)]
#[command(
    name = "ghidra-relabel",
    version,
    about = "Bulk relabel and export functions from a remote Ghidra analysis server",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Give machine-generated function names a meaningful name.
    ///
    /// For each function matching the pattern:
    /// - Decompile it on the server.
    /// - Ask the naming service for a camelCase name.
    /// - Suffix the name if it is already taken, then rename the function.
    ///
    /// Stops with a non-zero exit after 10 naming failures in a row.
    Rename {
        /// Analysis server base URL. Defaults to http://127.0.0.1:8080/.
        server_url: Option<String>,

        /// Substring selecting which functions to rename (default `FUN_`).
        #[arg(long)]
        pattern: Option<String>,

        /// Functions requested per listing page (default 50).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Seconds to wait after each function (default 1.0).
        #[arg(long)]
        delay: Option<f64>,

        /// Optional JSON or YAML run configuration.
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Save the decompiled code of every function to its own file.
    ///
    /// Files land in a new timestamped directory under the output root.
    Export {
        /// Analysis server base URL. Defaults to http://127.0.0.1:8080/.
        server_url: Option<String>,

        /// Number of worker threads (default 10). Invalid values fall back to the default.
        workers: Option<String>,

        /// Functions requested per listing page (default 50).
        #[arg(long)]
        batch_size: Option<usize>,

        /// Directory in which the timestamped output directory is created.
        #[arg(long)]
        output_root: Option<PathBuf>,

        /// Optional JSON or YAML run configuration.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Rename { server_url, pattern, batch_size, delay, config } => {
            rename_command(RenameOptions { server_url, pattern, batch_size, delay, config })?
        }
        Command::Export { server_url, workers, batch_size, output_root, config } => {
            export_command(ExportOptions { server_url, workers, batch_size, output_root, config })?
        }
    }

    Ok(())
}
