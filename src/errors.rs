use std::fmt::Display;

use thiserror::Error;

/// Failures surfaced by the token cache, its upstream source and the eviction sweep.
///
/// Cloneable so that one failed upstream fetch can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Upstream call failed, answered with a non-success status or an undecodable body.
    #[error("upstream unavailable: {reason}")]
    UpstreamUnavailable { reason: String },
    /// A registered cache name no longer resolves to a live cache.
    #[error("cache '{name}' is registered but no longer exists")]
    NoSuchCache { name: String },
    /// A cache refused to clear during the sweep.
    #[error("cache '{name}' failed to clear: {reason}")]
    ClearFailed { name: String, reason: String },
}

impl RelayError {
    pub fn upstream(reason: impl Display) -> Self {
        RelayError::UpstreamUnavailable {
            reason: reason.to_string(),
        }
    }

    pub fn no_such_cache(name: impl Into<String>) -> Self {
        RelayError::NoSuchCache { name: name.into() }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::UpstreamUnavailable { .. } => "upstream_unavailable",
            RelayError::NoSuchCache { .. } => "no_such_cache",
            RelayError::ClearFailed { .. } => "clear_failed",
        }
    }
}
