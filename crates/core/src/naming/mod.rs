//! Name inference: an external service proposes a name, `NameResolver`
//! decides whether it is usable.

pub mod chat;

pub use chat::ChatNamingService;

use thiserror::Error;
use tracing::debug;

use crate::model::NamingOutcome;

/// Longest name the resolver will accept, in characters.
pub const MAX_NAME_LEN: usize = 50;

/// Reply the naming instruction asks for when the code cannot be analysed.
const NO_NAME_REPLY: &str = "None";

#[derive(Debug, Error)]
pub enum NamingError {
    #[error("naming request failed: {0}")]
    Transport(String),
    #[error("naming API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("naming API returned no choices")]
    EmptyResponse,
}

/// Text in, candidate name out.
pub trait NamingService: Send + Sync {
    fn suggest(&self, decompiled: &str) -> Result<String, NamingError>;
}

/// Check a raw candidate and return the cleaned name, or why it was refused.
pub fn validate_candidate(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("empty name".to_string());
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(format!("name is {len} characters (max {MAX_NAME_LEN})"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("name contains whitespace: {name:?}"));
    }
    if name == NO_NAME_REPLY {
        return Err("service could not name the function".to_string());
    }
    Ok(name.to_string())
}

/// Wraps a naming service and enforces the validity rules. One call per
/// function, no retries.
pub struct NameResolver<'a> {
    service: &'a dyn NamingService,
}

impl<'a> NameResolver<'a> {
    pub fn new(service: &'a dyn NamingService) -> Self {
        Self { service }
    }

    pub fn resolve(&self, decompiled: &str) -> NamingOutcome {
        match self.service.suggest(decompiled) {
            Ok(raw) => match validate_candidate(&raw) {
                Ok(name) => NamingOutcome::Accepted(name),
                Err(reason) => {
                    debug!(candidate = %raw, %reason, "naming candidate rejected");
                    NamingOutcome::Rejected(reason)
                }
            },
            Err(e) => NamingOutcome::TransportFailure(e.to_string()),
        }
    }
}

