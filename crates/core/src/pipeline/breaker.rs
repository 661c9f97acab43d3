use crate::model::NamingOutcome;

/// Consecutive-failure threshold used when none is configured.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerSignal {
    Continue,
    Abort,
}

/// Counts naming failures in a row across the whole run.
///
/// Any accepted name resets the count. Rename-commit failures are not
/// recorded here.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    consecutive_failures: u32,
    threshold: u32,
}

impl CircuitBreaker {
    pub fn new(threshold: u32) -> Self {
        Self { consecutive_failures: 0, threshold: threshold.max(1) }
    }

    /// Record one naming outcome. Returns `Abort` on the failure that brings
    /// the count to the threshold, and on every failure after it.
    pub fn record(&mut self, outcome: &NamingOutcome) -> BreakerSignal {
        match outcome {
            NamingOutcome::Accepted(_) => {
                self.consecutive_failures = 0;
                BreakerSignal::Continue
            }
            NamingOutcome::Rejected(_) | NamingOutcome::TransportFailure(_) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.threshold {
                    BreakerSignal::Abort
                } else {
                    BreakerSignal::Continue
                }
            }
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(DEFAULT_FAILURE_THRESHOLD)
    }
}

