use std::ops::ControlFlow;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::model::{FunctionHandle, ItemOutcome, NamingOutcome};
use crate::naming::{NameResolver, NamingService};
use crate::pipeline::breaker::{BreakerSignal, CircuitBreaker, DEFAULT_FAILURE_THRESHOLD};
use crate::pipeline::collision::CollisionGuard;
use crate::pipeline::pagination::{ListingSource, PaginationDriver, PaginationEnd};
use crate::pipeline::PipelineError;
use crate::report::Console;
use crate::server::AnalysisServer;

/// Tunables for the sequential rename pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameSettings {
    /// Substring selecting which functions to rename.
    pub pattern: String,
    pub batch_size: usize,
    /// Pause after every item, in seconds, to stay under API rate limits.
    pub delay_secs: f64,
    pub failure_threshold: u32,
}

impl Default for RenameSettings {
    fn default() -> Self {
        Self {
            pattern: "FUN_".to_string(),
            batch_size: 50,
            delay_secs: 1.0,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
        }
    }
}

impl RenameSettings {
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_secs).unwrap_or(Duration::ZERO)
    }
}

/// A committed rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameRecord {
    pub old_name: String,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenameSummary {
    pub renamed: usize,
    pub skipped: usize,
    pub naming_failures: usize,
    /// Breaker count when the run ended.
    pub consecutive_failures: u32,
    pub pages: usize,
    pub listing_error: Option<String>,
}

/// State for one sequential rename run.
///
/// Everything a step needs (server, resolver, breaker, console, counters)
/// lives here and is passed by reference; there is no global run state.
pub struct RenameRun<'a> {
    server: &'a dyn AnalysisServer,
    resolver: NameResolver<'a>,
    guard: CollisionGuard<'a>,
    breaker: CircuitBreaker,
    console: &'a Console,
    settings: RenameSettings,
    renamed: usize,
    skipped: usize,
    naming_failures: usize,
}

impl<'a> RenameRun<'a> {
    pub fn new(
        server: &'a dyn AnalysisServer,
        naming: &'a dyn NamingService,
        console: &'a Console,
        settings: RenameSettings,
    ) -> Self {
        Self {
            server,
            resolver: NameResolver::new(naming),
            guard: CollisionGuard::new(server),
            breaker: CircuitBreaker::new(settings.failure_threshold),
            console,
            settings,
            renamed: 0,
            skipped: 0,
            naming_failures: 0,
        }
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Take one function through decompile → name → dedupe → rename.
    ///
    /// Decompile and rename failures skip the item without touching the
    /// breaker; naming failures skip it and count toward the breaker.
    pub fn process(&mut self, handle: &FunctionHandle) -> ItemOutcome<RenameRecord> {
        let decompiled = match self.server.decompile(&handle.clean_name) {
            Ok(text) if text.trim().is_empty() => {
                return ItemOutcome::Skip("no decompilation output".to_string())
            }
            Ok(text) => text,
            Err(e) => return ItemOutcome::Skip(format!("decompile failed: {e}")),
        };

        self.console.line(format!("Analysing function: {}", handle.raw_label));
        let signature = decompiled.lines().find(|l| !l.trim().is_empty()).unwrap_or_default();
        self.console.line(format!("Signature: {}", signature.trim()));

        let outcome = self.resolver.resolve(&decompiled);
        let signal = self.breaker.record(&outcome);
        let candidate = match outcome {
            NamingOutcome::Accepted(name) => name,
            NamingOutcome::Rejected(reason) | NamingOutcome::TransportFailure(reason) => {
                self.naming_failures += 1;
                warn!(
                    function = %handle.clean_name,
                    %reason,
                    consecutive = self.breaker.consecutive_failures(),
                    "naming failed"
                );
                if signal == BreakerSignal::Abort {
                    return ItemOutcome::Abort;
                }
                return ItemOutcome::Skip(format!("naming failed: {reason}"));
            }
        };

        let new_name = self.guard.dedupe(&candidate);
        match self.server.rename_function(&handle.clean_name, &new_name) {
            Ok(_) => ItemOutcome::Commit(RenameRecord {
                old_name: handle.clean_name.clone(),
                new_name,
            }),
            Err(e) => ItemOutcome::Skip(format!("rename to {new_name} failed: {e}")),
        }
    }

    /// Page through the matching functions and rename each one.
    ///
    /// Returns `PipelineError::CircuitOpen` as soon as the breaker trips; no
    /// further item is attempted after that.
    pub fn run(&mut self) -> Result<RenameSummary, PipelineError> {
        let source = ListingSource::Search { pattern: self.settings.pattern.clone() };
        let delay = self.settings.delay();
        let mut driver =
            PaginationDriver::new(self.server, source, self.settings.batch_size, self.console);

        let end = driver.run(|_cursor, page| {
            for label in page {
                let Some(handle) = FunctionHandle::parse(&label) else {
                    continue;
                };
                match self.process(&handle) {
                    ItemOutcome::Commit(record) => {
                        self.renamed += 1;
                        info!(old = %record.old_name, new = %record.new_name, "renamed");
                        self.console
                            .line(format!("Renamed: {} -> {}", handle.raw_label, record.new_name));
                    }
                    ItemOutcome::Skip(reason) => {
                        self.skipped += 1;
                        self.console.line(format!("Skipped {}: {}", handle.raw_label, reason));
                    }
                    ItemOutcome::Abort => return ControlFlow::Break(()),
                }
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
            ControlFlow::Continue(())
        });

        let pages = driver.pages();
        let listing_error = match end {
            PaginationEnd::Halted => {
                let failures = self.breaker.consecutive_failures();
                let threshold = self.breaker.threshold();
                error!(failures, threshold, "circuit breaker open; stopping run");
                self.console.line(format!(
                    "{failures} consecutive naming failures. Check the API key and network connection. Stopping."
                ));
                return Err(PipelineError::CircuitOpen { failures, threshold });
            }
            PaginationEnd::ListingFailed(e) => Some(e.to_string()),
            PaginationEnd::Exhausted => None,
        };

        let summary = RenameSummary {
            renamed: self.renamed,
            skipped: self.skipped,
            naming_failures: self.naming_failures,
            consecutive_failures: self.breaker.consecutive_failures(),
            pages,
            listing_error,
        };
        self.console.line(format!(
            "Done: {} renamed, {} skipped ({} naming failures) over {} page(s)",
            summary.renamed, summary.skipped, summary.naming_failures, summary.pages
        ));
        Ok(summary)
    }
}
