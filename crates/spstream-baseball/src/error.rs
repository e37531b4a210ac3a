// Errors surfaced by the analysis service.

use spstream_core::config::SettingsError;
use thiserror::Error;

use crate::source::{FeedKind, SourceError};

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Settings were rejected before any work ran.
    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),

    /// A feed could not be fetched; nothing was analyzed or cached.
    #[error("{feed} feed unavailable: {source}")]
    UpstreamUnavailable { feed: FeedKind, source: SourceError },
}

impl AnalysisError {
    /// Upstream failures are transient; bad settings are a caller bug.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::UpstreamUnavailable { .. })
    }
}
