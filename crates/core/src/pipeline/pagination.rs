use std::ops::ControlFlow;

use tracing::{debug, warn};

use crate::model::BatchCursor;
use crate::report::Console;
use crate::server::{AnalysisServer, ServerError};

/// Which listing endpoint a run pages through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    /// Functions whose name contains `pattern` (e.g. `FUN_`).
    Search { pattern: String },
    /// Every function in the program.
    AllMethods,
}

/// Why a pagination loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationEnd {
    /// The server returned an empty page.
    Exhausted,
    /// The page visitor asked to stop.
    Halted,
    /// A page could not be fetched. Retrying the same offset against a dead
    /// server would never end, so the loop stops here.
    ListingFailed(ServerError),
}

/// Drives offset/limit pagination until the server returns an empty page.
///
/// A short page is not treated as the end: the server may filter entries,
/// so only an empty page means the listing is exhausted.
pub struct PaginationDriver<'a> {
    server: &'a dyn AnalysisServer,
    source: ListingSource,
    cursor: BatchCursor,
    console: &'a Console,
    pages: usize,
}

impl<'a> PaginationDriver<'a> {
    pub fn new(
        server: &'a dyn AnalysisServer,
        source: ListingSource,
        limit: usize,
        console: &'a Console,
    ) -> Self {
        Self { server, source, cursor: BatchCursor::new(limit.max(1)), console, pages: 0 }
    }

    pub fn cursor(&self) -> BatchCursor {
        self.cursor
    }

    /// Number of non-empty pages handed to the visitor so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn fetch_page(&self) -> Result<Vec<String>, ServerError> {
        let BatchCursor { offset, limit } = self.cursor;
        match &self.source {
            ListingSource::Search { pattern } => {
                self.server.search_functions(pattern, offset, limit)
            }
            ListingSource::AllMethods => self.server.list_methods(offset, limit),
        }
    }

    /// Fetch pages and hand each one to `visit`, advancing by `limit` after
    /// every page regardless of what the visitor did with it.
    pub fn run<F>(&mut self, mut visit: F) -> PaginationEnd
    where
        F: FnMut(&BatchCursor, Vec<String>) -> ControlFlow<()>,
    {
        loop {
            let page = match self.fetch_page() {
                Ok(page) => page,
                Err(e) => {
                    warn!(offset = self.cursor.offset, error = %e, "listing request failed");
                    self.console.line(format!(
                        "Listing failed at offset {}: {}",
                        self.cursor.offset, e
                    ));
                    return PaginationEnd::ListingFailed(e);
                }
            };
            if page.is_empty() {
                debug!(offset = self.cursor.offset, "empty page; listing exhausted");
                self.console.line("No more functions to process");
                return PaginationEnd::Exhausted;
            }

            self.pages += 1;
            self.console.line(format!(
                "Processing functions {} to {}...",
                self.cursor.first_index(),
                self.cursor.last_index(page.len())
            ));
            let flow = visit(&self.cursor, page);
            self.cursor.advance();
            if flow.is_break() {
                return PaginationEnd::Halted;
            }
        }
    }
}
