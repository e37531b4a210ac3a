// Snapshot source boundary: where roster, ownership, and schedule data come from.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::snapshot::{OwnershipSnapshot, RosterSnapshot, ScheduleSnapshot};

/// The three upstream feeds an analysis needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Roster,
    Ownership,
    Schedule,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedKind::Roster => write!(f, "roster"),
            FeedKind::Ownership => write!(f, "ownership"),
            FeedKind::Schedule => write!(f, "schedule"),
        }
    }
}

/// A snapshot could not be produced. Collaborators translate their own
/// transport and parsing failures into one of these.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("request to {url} failed: {message}")]
    Http { url: String, message: String },

    #[error("malformed {what}: {message}")]
    Decode { what: String, message: String },
}

/// Provider of the feeds an analysis run consumes.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// The roster for `team_key`.
    async fn roster(&self, team_key: &str) -> Result<RosterSnapshot, SourceError>;

    /// League-wide ownership.
    async fn ownership(&self) -> Result<OwnershipSnapshot, SourceError>;

    /// Probable starters and team games between `start` and `end`, inclusive.
    async fn schedule(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleSnapshot, SourceError>;
}
