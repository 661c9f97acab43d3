//! Batch orchestration: pagination, failure tracking, and the two pipelines
//! that consume the listing.
//!
//! - `pagination`: offset/limit driver over the server listing.
//! - `breaker`: consecutive naming-failure counter.
//! - `collision`: best-effort suffixing of names already in use.
//! - `rename`: sequential decompile → name → dedupe → rename flow.
//! - `export`: concurrent decompile → file export flow.

pub mod breaker;
pub mod collision;
pub mod export;
pub mod pagination;
pub mod rename;

use std::path::PathBuf;

use thiserror::Error;

pub use breaker::{BreakerSignal, CircuitBreaker};
pub use collision::CollisionGuard;
pub use export::{
    ExportOutcome, ExportRecord, ExportRun, ExportSettings, ExportSummary, FileAllocator,
};
pub use pagination::{ListingSource, PaginationDriver, PaginationEnd};
pub use rename::{RenameRecord, RenameRun, RenameSettings, RenameSummary};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Too many naming failures in a row; the whole run must stop.
    #[error("{failures} consecutive naming failures (threshold {threshold}); check the naming service credentials and connectivity")]
    CircuitOpen { failures: u32, threshold: u32 },

    #[error("Failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),
}
