// Streaming recommendation service: fetch snapshots, analyze, and cache.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures_util::future::try_join3;
use spstream_core::cache::{CacheKey, CacheStats, ResultCache};
use spstream_core::clock::Clock;
use spstream_core::config::AnalysisSettings;
use tracing::{info, warn};

use crate::engine::{analyze, AnalysisResult};
use crate::error::AnalysisError;
use crate::source::{FeedKind, SnapshotSource, SourceError};
use crate::window::{resolve_week, LeagueCalendar};

/// Entry point for the presentation layer.
///
/// Results are cached per (team, day, settings) for `ttl`. Concurrent
/// requests for the same key share a single fetch-and-analyze cycle.
pub struct StreamerService {
    source: Arc<dyn SnapshotSource>,
    cache: ResultCache<AnalysisResult>,
    clock: Arc<dyn Clock>,
    calendar: LeagueCalendar,
    team_key: String,
    settings: AnalysisSettings,
    ttl: Duration,
}

impl StreamerService {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        clock: Arc<dyn Clock>,
        calendar: LeagueCalendar,
        team_key: impl Into<String>,
        settings: AnalysisSettings,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            cache: ResultCache::new(Arc::clone(&clock)),
            clock,
            calendar,
            team_key: team_key.into(),
            settings,
            ttl,
        }
    }

    /// Recommendations for `today` using the configured settings.
    pub async fn recommendations(
        &self,
        today: NaiveDate,
    ) -> Result<Arc<AnalysisResult>, AnalysisError> {
        self.recommendations_with(today, &self.settings).await
    }

    /// Recommendations for `today` using one-off settings. Different
    /// settings never share a cached result.
    pub async fn recommendations_with(
        &self,
        today: NaiveDate,
        settings: &AnalysisSettings,
    ) -> Result<Arc<AnalysisResult>, AnalysisError> {
        settings.validate()?;

        let week = resolve_week(today, &self.calendar, &settings.target_weekdays);
        let key = CacheKey::new(
            self.team_key.as_str(),
            format!("{today}|{}", settings.fingerprint()),
        );
        info!(team = %self.team_key, %today, week = week.week_number, "recommendations requested");

        self.cache
            .get_or_compute(&key, self.ttl, || async {
                let (roster, ownership, schedule) = try_join3(
                    fetch(FeedKind::Roster, self.source.roster(&self.team_key)),
                    fetch(FeedKind::Ownership, self.source.ownership()),
                    fetch(
                        FeedKind::Schedule,
                        self.source.schedule(week.start_date, week.end_date),
                    ),
                )
                .await?;

                analyze(
                    today,
                    &self.calendar,
                    &roster,
                    &ownership,
                    &schedule,
                    settings,
                    self.clock.now(),
                )
            })
            .await
    }

    /// Drop every cached result. Returns how many were removed.
    pub async fn clear_cache(&self) -> usize {
        let removed = self.cache.invalidate_all().await;
        self.cache.purge_expired();
        info!(removed, "cache cleared");
        removed
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

async fn fetch<T, F>(feed: FeedKind, request: F) -> Result<T, AnalysisError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    request.await.map_err(|source| {
        warn!(%feed, error = %source, "upstream fetch failed");
        AnalysisError::UpstreamUnavailable { feed, source }
    })
}
