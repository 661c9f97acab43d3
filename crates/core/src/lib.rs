//! relabel-core
//!
//! Core library for driving a remote binary-analysis server in bulk: page
//! through its function listing, decompile each function, and either give it
//! a meaningful name or write its decompilation to disk.
//!
//! All state, ordering and failure handling lives here so it is fully
//! testable without a terminal or a live server. The CLI is a thin frontend.

pub mod config;
pub mod model;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod server;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
