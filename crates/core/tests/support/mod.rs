//! In-process stand-ins for the analysis server and the naming service.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use relabel_core::naming::{NamingError, NamingService};
use relabel_core::report::Console;
use relabel_core::server::{AnalysisServer, ServerError};

/// Fake analysis server backed by a static listing.
///
/// Listing calls (search and methods) page through `listing` by
/// offset/limit unless explicit `pages` are given, in which case page
/// `offset / limit` is returned. Every call is recorded in `events`.
#[derive(Default)]
pub struct FakeServer {
    pub listing: Vec<String>,
    pub pages: Option<Vec<Vec<String>>>,
    pub existing_names: HashSet<String>,
    pub decompiled: HashMap<String, Result<String, ServerError>>,
    pub listing_error: Option<ServerError>,
    pub rename_error: Option<ServerError>,
    pub events: Mutex<Vec<String>>,
    pub renames: Mutex<Vec<(String, String)>>,
    pub decompile_calls: Mutex<Vec<String>>,
}

impl FakeServer {
    pub fn with_listing(labels: &[&str]) -> Self {
        Self { listing: labels.iter().map(|s| s.to_string()).collect(), ..Self::default() }
    }

    pub fn with_pages(pages: Vec<Vec<&str>>) -> Self {
        Self {
            pages: Some(
                pages.into_iter().map(|p| p.into_iter().map(String::from).collect()).collect(),
            ),
            ..Self::default()
        }
    }

    pub fn decompiles(mut self, name: &str, result: Result<&str, ServerError>) -> Self {
        self.decompiled.insert(name.to_string(), result.map(String::from));
        self
    }

    pub fn listing_offsets(&self) -> Vec<usize> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| e.strip_prefix("list ").and_then(|o| o.parse().ok()))
            .collect()
    }

    fn page(&self, query: Option<&str>, offset: usize, limit: usize) -> Vec<String> {
        if let Some(pages) = &self.pages {
            return pages.get(offset / limit.max(1)).cloned().unwrap_or_default();
        }
        let matches: Vec<String> = match query {
            Some(q) => self.listing.iter().filter(|l| l.contains(q)).cloned().collect(),
            None => self.listing.clone(),
        };
        matches.into_iter().skip(offset).take(limit).collect()
    }
}

impl AnalysisServer for FakeServer {
    fn search_functions(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, ServerError> {
        if limit == 1 {
            // Collision lookups (limit 1) only consult the names already in use.
            self.events.lock().push(format!("lookup {query}"));
            return Ok(self.existing_names.iter().filter(|n| n.contains(query)).cloned().collect());
        }
        self.events.lock().push(format!("list {offset}"));
        if let Some(e) = &self.listing_error {
            return Err(e.clone());
        }
        Ok(self.page(Some(query), offset, limit))
    }

    fn list_methods(&self, offset: usize, limit: usize) -> Result<Vec<String>, ServerError> {
        self.events.lock().push(format!("list {offset}"));
        if let Some(e) = &self.listing_error {
            return Err(e.clone());
        }
        Ok(self.page(None, offset, limit))
    }

    fn decompile(&self, name: &str) -> Result<String, ServerError> {
        self.events.lock().push(format!("decompile {name}"));
        self.decompile_calls.lock().push(name.to_string());
        self.decompiled
            .get(name)
            .cloned()
            .unwrap_or_else(|| Ok(format!("int {name}(int a)\n{{\n  return a + 1;\n}}\n")))
    }

    fn rename_function(&self, old_name: &str, new_name: &str) -> Result<String, ServerError> {
        self.events.lock().push(format!("rename {old_name} {new_name}"));
        if let Some(e) = &self.rename_error {
            return Err(e.clone());
        }
        self.renames.lock().push((old_name.to_string(), new_name.to_string()));
        Ok("Renamed successfully".to_string())
    }
}

/// Naming service that replays scripted answers, then fails.
#[derive(Default)]
pub struct ScriptedNaming {
    answers: Mutex<VecDeque<Result<String, String>>>,
    pub calls: Mutex<usize>,
}

impl ScriptedNaming {
    pub fn new(answers: Vec<Result<&str, &str>>) -> Self {
        Self {
            answers: Mutex::new(
                answers.into_iter().map(|a| a.map(String::from).map_err(String::from)).collect(),
            ),
            calls: Mutex::new(0),
        }
    }

    /// Every call fails at the transport level.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }
}

impl NamingService for ScriptedNaming {
    fn suggest(&self, _decompiled: &str) -> Result<String, NamingError> {
        *self.calls.lock() += 1;
        match self.answers.lock().pop_front() {
            Some(Ok(name)) => Ok(name),
            Some(Err(msg)) => Err(NamingError::Transport(msg)),
            None => Err(NamingError::Transport("connection refused".into())),
        }
    }
}

/// In-memory sink for checking what a run printed.
#[derive(Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn console(&self) -> Console {
        Console::new(Box::new(self.clone()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
