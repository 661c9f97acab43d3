use std::collections::HashSet;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Local};
use parking_lot::Mutex;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::FunctionHandle;
use crate::pipeline::pagination::{ListingSource, PaginationDriver, PaginationEnd};
use crate::pipeline::PipelineError;
use crate::report::Console;
use crate::server::AnalysisServer;

/// Worker count used when none (or an invalid one) is given.
pub const DEFAULT_WORKERS: usize = 10;

const FILE_EXTENSION: &str = "txt";

/// Tunables for the concurrent export pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub batch_size: usize,
    pub workers: usize,
    /// Directory the timestamped run directory is created in.
    pub output_root: PathBuf,
    pub dir_prefix: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            batch_size: 50,
            workers: DEFAULT_WORKERS,
            output_root: PathBuf::from("."),
            dir_prefix: "project_".to_string(),
        }
    }
}

impl ExportSettings {
    /// `<output_root>/<dir_prefix><YYYYmmdd_HHMM>`.
    pub fn output_dir_at(&self, now: DateTime<Local>) -> PathBuf {
        self.output_root.join(format!("{}{}", self.dir_prefix, now.format("%Y%m%d_%H%M")))
    }
}

/// Replace characters that are not allowed in file names.
pub fn sanitize_file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if matches!(stem.trim(), "" | "." | "..") {
        "_".to_string()
    } else {
        stem
    }
}

/// Hands out unique file paths inside one output directory.
///
/// Each allocation checks the disk and the set of names already handed out
/// under a single lock, so two workers can never receive the same path even
/// before either file has been written.
#[derive(Debug)]
pub struct FileAllocator {
    dir: PathBuf,
    reserved: Mutex<HashSet<PathBuf>>,
}

impl FileAllocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), reserved: Mutex::new(HashSet::new()) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `name.txt`, then `name_1.txt`, `name_2.txt`, ... until a free one is found.
    pub fn allocate(&self, clean_name: &str) -> PathBuf {
        let stem = sanitize_file_stem(clean_name);
        let mut reserved = self.reserved.lock();
        let mut candidate = self.dir.join(format!("{stem}.{FILE_EXTENSION}"));
        let mut counter = 1usize;
        while candidate.exists() || reserved.contains(&candidate) {
            candidate = self.dir.join(format!("{stem}_{counter}.{FILE_EXTENSION}"));
            counter += 1;
        }
        reserved.insert(candidate.clone());
        candidate
    }
}

/// One decompiled function ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub handle: FunctionHandle,
    pub decompiled_text: String,
    pub assigned_file: PathBuf,
}

impl ExportRecord {
    /// Two-line header (label, save time), a blank line, then the code.
    pub fn render(&self, saved_at: DateTime<Local>) -> String {
        format!(
            "// Function: {}\n// Saved at: {}\n\n{}",
            self.handle.raw_label,
            saved_at.format("%Y-%m-%d %H:%M:%S"),
            self.decompiled_text
        )
    }

    pub fn write(&self) -> Result<(), PipelineError> {
        std::fs::write(&self.assigned_file, self.render(Local::now())).map_err(|source| {
            PipelineError::Write { path: self.assigned_file.clone(), source }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pages: usize,
    pub output_dir: PathBuf,
    pub listing_error: Option<String>,
}

/// Result of exporting one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    Skipped(String),
}

/// State for one export run, shared by reference with every worker.
pub struct ExportRun<'a> {
    server: &'a dyn AnalysisServer,
    console: &'a Console,
    settings: ExportSettings,
    allocator: FileAllocator,
    saved: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
}

impl<'a> ExportRun<'a> {
    /// Create the timestamped output directory and prepare a run.
    pub fn new(
        server: &'a dyn AnalysisServer,
        console: &'a Console,
        settings: ExportSettings,
    ) -> Result<Self, PipelineError> {
        let dir = settings.output_dir_at(Local::now());
        std::fs::create_dir_all(&dir)
            .map_err(|source| PipelineError::OutputDir { path: dir.clone(), source })?;
        info!(dir = %dir.display(), "export directory ready");
        Ok(Self {
            server,
            console,
            settings,
            allocator: FileAllocator::new(dir),
            saved: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        })
    }

    pub fn output_dir(&self) -> &Path {
        self.allocator.dir()
    }

    /// Decompile one function and write it to a freshly allocated file.
    pub fn process(&self, handle: FunctionHandle) -> Result<ExportOutcome, PipelineError> {
        let decompiled_text = match self.server.decompile(&handle.clean_name) {
            Ok(text) if text.trim().is_empty() => {
                return Ok(ExportOutcome::Skipped("no decompilation output".to_string()))
            }
            Ok(text) => text,
            Err(e) => return Ok(ExportOutcome::Skipped(format!("decompile failed: {e}"))),
        };

        self.console.line(format!("Processing function: {}", handle.raw_label));
        let assigned_file = self.allocator.allocate(&handle.clean_name);
        let record = ExportRecord { handle, decompiled_text, assigned_file };
        record.write()?;
        Ok(ExportOutcome::Saved(record.assigned_file))
    }

    fn settle(&self, handle: FunctionHandle) {
        let label = handle.raw_label.clone();
        match self.process(handle) {
            Ok(ExportOutcome::Saved(path)) => {
                self.saved.fetch_add(1, Ordering::Relaxed);
                debug!(function = %label, path = %path.display(), "saved");
                self.console.line(format!("Saved to: {}", path.display()));
            }
            Ok(ExportOutcome::Skipped(reason)) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                self.console.line(format!("Skipped {label}: {reason}"));
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(function = %label, error = %e, "export failed");
                self.console.line(format!("Failed to save {label}: {e}"));
            }
        }
    }

    /// Page through every function, exporting each page on the worker pool.
    ///
    /// A page is fully drained (every item saved, skipped or failed) before
    /// the next page is requested.
    pub fn run(&self) -> Result<ExportSummary, PipelineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.settings.workers.max(1))
            .thread_name(|i| format!("export-worker-{i}"))
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

        let mut driver = PaginationDriver::new(
            self.server,
            ListingSource::AllMethods,
            self.settings.batch_size,
            self.console,
        );
        let end = driver.run(|_cursor, page| {
            pool.scope(|scope| {
                for label in page {
                    if let Some(handle) = FunctionHandle::parse(&label) {
                        scope.spawn(move |_| self.settle(handle));
                    }
                }
            });
            ControlFlow::Continue(())
        });

        let listing_error = match end {
            PaginationEnd::ListingFailed(e) => Some(e.to_string()),
            PaginationEnd::Exhausted | PaginationEnd::Halted => None,
        };
        let summary = ExportSummary {
            saved: self.saved.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            pages: driver.pages(),
            output_dir: self.output_dir().to_path_buf(),
            listing_error,
        };
        self.console.line(format!(
            "Done: {} saved, {} skipped, {} failed; output in {}",
            summary.saved,
            summary.skipped,
            summary.failed,
            summary.output_dir.display()
        ));
        Ok(summary)
    }
}
