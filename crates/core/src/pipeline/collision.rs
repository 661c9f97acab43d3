use rand::Rng;
use tracing::{debug, warn};

use crate::server::AnalysisServer;

/// Range the random collision suffix is drawn from.
pub const SUFFIX_RANGE: std::ops::RangeInclusive<u32> = 1000..=9999;

/// Reduces the chance of renaming a function to a name already in use.
///
/// The check is a single substring search against the server and nothing
/// stops the server's namespace from changing between the search and the
/// rename, so a collision is still possible. It only holds up under the
/// single-writer sequential pipeline.
pub struct CollisionGuard<'a> {
    server: &'a dyn AnalysisServer,
}

impl<'a> CollisionGuard<'a> {
    pub fn new(server: &'a dyn AnalysisServer) -> Self {
        Self { server }
    }

    pub fn dedupe(&self, candidate: &str) -> String {
        self.dedupe_with(candidate, &mut rand::thread_rng())
    }

    /// Return `candidate`, or `candidate_NNNN` if the server already knows a
    /// matching name. A failed lookup is treated as a match.
    pub fn dedupe_with<R: Rng>(&self, candidate: &str, rng: &mut R) -> String {
        let taken = match self.server.search_functions(candidate, 0, 1) {
            Ok(hits) => !hits.is_empty(),
            Err(e) => {
                warn!(candidate, error = %e, "name lookup failed; suffixing to be safe");
                true
            }
        };
        if !taken {
            return candidate.to_string();
        }
        let deduped = format!("{}_{}", candidate, rng.gen_range(SUFFIX_RANGE));
        debug!(candidate, deduped = %deduped, "name already in use");
        deduped
    }
}
