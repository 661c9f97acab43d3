//! Core data model for one batch run.
//!
//! - `FunctionHandle`: a listing entry plus the name used in follow-up calls.
//! - `BatchCursor`: offset/limit pagination state over the source listing.
//! - `NamingOutcome`: what the naming step produced for one function.
//! - `ItemOutcome`: per-item result threaded through the rename pipeline.

use serde::{Deserialize, Serialize};

/// Separator the server uses between a function name and its entry address.
const ADDRESS_SEPARATOR: &str = " @ ";

/// Strip the trailing `" @ <address>"` annotation from a listing label.
///
/// Idempotent: an already clean name comes back unchanged.
pub fn clean_label(raw: &str) -> &str {
    let name = match raw.find(ADDRESS_SEPARATOR) {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    name.trim()
}

/// A function as seen in the server listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionHandle {
    /// Listing entry exactly as returned, e.g. `FUN_00401000 @ 00401000`.
    pub raw_label: String,
    /// Identifier used for decompile/rename calls.
    pub clean_name: String,
}

impl FunctionHandle {
    /// Build a handle from a listing line.
    ///
    /// Returns `None` for blank lines and for labels that are nothing but an
    /// address annotation, so a handle never carries an empty clean name.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw_label = raw.trim_end_matches(['\r', '\n']);
        if raw_label.trim().is_empty() {
            return None;
        }
        let clean_name = clean_label(raw_label);
        if clean_name.is_empty() {
            return None;
        }
        Some(Self { raw_label: raw_label.to_string(), clean_name: clean_name.to_string() })
    }
}

/// Offset/limit position in the remote listing.
///
/// The offset only ever moves forward, by exactly `limit` per page, no matter
/// how many items of that page were committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCursor {
    pub offset: usize,
    pub limit: usize,
}

impl BatchCursor {
    pub fn new(limit: usize) -> Self {
        Self { offset: 0, limit }
    }

    /// Move to the next page.
    pub fn advance(&mut self) {
        self.offset += self.limit;
    }

    /// 1-based index of the first item on the current page.
    pub fn first_index(&self) -> usize {
        self.offset + 1
    }

    /// 1-based index of the last item on a page of `len` entries.
    pub fn last_index(&self, len: usize) -> usize {
        self.offset + len
    }
}

/// Result of asking the naming service for a function name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamingOutcome {
    Accepted(String),
    /// The service answered, but the candidate failed validation.
    Rejected(String),
    /// The service could not be reached or returned an API error.
    TransportFailure(String),
}

impl NamingOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, NamingOutcome::Accepted(_))
    }
}

/// Per-item result propagated explicitly through a pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome<T> {
    Commit(T),
    Skip(String),
    /// Stop the whole run; only the circuit breaker produces this.
    Abort,
}

