//! Typed boundary to the remote analysis server.
//!
//! Every call returns an explicit `Result`; callers never inspect payload
//! text to decide whether a request failed.

pub mod http;

pub use http::HttpAnalysisServer;

use thiserror::Error;

/// Server address used when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080/";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// Non-2xx HTTP status.
    #[error("Error {code}: {body}")]
    Status { code: u16, body: String },
    /// Connection, timeout or decoding failure.
    #[error("Request failed: {0}")]
    Transport(String),
    /// 2xx response whose body is the server's own failure notice.
    #[error("server refused request: {0}")]
    Refused(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Operations the pipelines need from the analysis server.
///
/// Implementations must be shareable across worker threads; each request is
/// independent and carries no client-side session state.
pub trait AnalysisServer: Send + Sync {
    /// Functions whose name contains `query`, one label per entry.
    fn search_functions(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, ServerError>;

    /// Full function listing, one label per entry.
    fn list_methods(&self, offset: usize, limit: usize) -> Result<Vec<String>, ServerError>;

    /// Decompiled C for the function called `name`.
    fn decompile(&self, name: &str) -> Result<String, ServerError>;

    /// Rename `old_name` to `new_name`, returning the server's confirmation text.
    fn rename_function(&self, old_name: &str, new_name: &str) -> Result<String, ServerError>;
}
