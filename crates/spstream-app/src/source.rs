// Snapshot source backed by local CSV files and an MLB schedule feed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use spstream_baseball::snapshot::{OwnershipSnapshot, RosterSnapshot, ScheduleSnapshot};
use spstream_baseball::source::{SnapshotSource, SourceError};
use spstream_core::config::Config;

use crate::feeds;
use crate::mlb::{decode_schedule, MlbScheduleClient};

/// Where probable starters come from.
pub enum ScheduleFeed {
    /// A saved MLB schedule response.
    File(PathBuf),
    Api(MlbScheduleClient),
}

pub struct LocalSource {
    roster_path: PathBuf,
    ownership_path: PathBuf,
    schedule: ScheduleFeed,
}

impl LocalSource {
    pub fn new(roster_path: PathBuf, ownership_path: PathBuf, schedule: ScheduleFeed) -> Self {
        Self {
            roster_path,
            ownership_path,
            schedule,
        }
    }

    /// Build from the `[sources]` and `[mlb]` config sections. Relative paths
    /// resolve against `base_dir`.
    pub fn from_config(config: &Config, base_dir: &Path) -> Result<Self, SourceError> {
        let schedule = match &config.sources.schedule {
            Some(path) => ScheduleFeed::File(base_dir.join(path)),
            None => ScheduleFeed::Api(MlbScheduleClient::new(
                &config.mlb.base_url,
                std::time::Duration::from_secs(config.mlb.timeout_secs),
            )?),
        };
        Ok(Self::new(
            base_dir.join(&config.sources.roster),
            base_dir.join(&config.sources.ownership),
            schedule,
        ))
    }
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path).await.map_err(|e| SourceError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[async_trait]
impl SnapshotSource for LocalSource {
    async fn roster(&self, team_key: &str) -> Result<RosterSnapshot, SourceError> {
        let bytes = read_bytes(&self.roster_path).await?;
        feeds::parse_roster(
            bytes.as_slice(),
            team_key,
            &self.roster_path.display().to_string(),
        )
    }

    async fn ownership(&self) -> Result<OwnershipSnapshot, SourceError> {
        let bytes = read_bytes(&self.ownership_path).await?;
        feeds::parse_ownership(bytes.as_slice(), &self.ownership_path.display().to_string())
    }

    async fn schedule(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleSnapshot, SourceError> {
        match &self.schedule {
            ScheduleFeed::Api(client) => client.fetch_schedule(start, end).await,
            ScheduleFeed::File(path) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| SourceError::Io {
                        path: path.clone(),
                        source: e,
                    })?;
                decode_schedule(&text, start, end).map_err(|e| SourceError::Decode {
                    what: path.display().to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn reads_all_three_feeds_from_files() {
        let dir = scratch("spstream_local_source_ok");
        fs::write(
            dir.join("roster.csv"),
            "player_id,name,positions,mlb_team,percent_owned\n458.p.1,Logan Webb,SP,SF,92\n",
        )
        .unwrap();
        fs::write(
            dir.join("ownership.csv"),
            "player_id,name,positions,mlb_team,percent_owned\n458.p.2,Nick Lodolo,SP,CIN,41\n",
        )
        .unwrap();
        fs::write(
            dir.join("schedule.json"),
            r#"{"dates":[{"date":"2025-06-02","games":[{"teams":{
                "away":{"team":{"name":"New York Yankees","abbreviation":"NYY"}},
                "home":{"team":{"name":"Cincinnati Reds","abbreviation":"CIN"},
                        "probablePitcher":{"id":668933,"fullName":"Nick Lodolo"}}}}]}]}"#,
        )
        .unwrap();

        let source = LocalSource::new(
            dir.join("roster.csv"),
            dir.join("ownership.csv"),
            ScheduleFeed::File(dir.join("schedule.json")),
        );
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();

        let roster = source.roster("t.6").await.unwrap();
        let ownership = source.ownership().await.unwrap();
        let schedule = source.schedule(start, end).await.unwrap();
        assert_eq!(roster.players[0].name, "Logan Webb");
        assert_eq!(ownership.players[0].percent_owned, Some(41.0));
        assert_eq!(schedule.starts.len(), 1);
        assert_eq!(schedule.starts[0].opponent, "NYY");

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn missing_files_are_io_errors() {
        let dir = scratch("spstream_local_source_missing");
        let source = LocalSource::new(
            dir.join("roster.csv"),
            dir.join("ownership.csv"),
            ScheduleFeed::File(dir.join("schedule.json")),
        );
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        assert!(matches!(source.roster("t.6").await, Err(SourceError::Io { .. })));
        assert!(matches!(source.ownership().await, Err(SourceError::Io { .. })));
        assert!(matches!(
            source.schedule(start, start).await,
            Err(SourceError::Io { .. })
        ));

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn corrupt_schedule_is_decode_error() {
        let dir = scratch("spstream_local_source_corrupt");
        fs::write(dir.join("schedule.json"), "<html>rate limited</html>").unwrap();
        let source = LocalSource::new(
            dir.join("roster.csv"),
            dir.join("ownership.csv"),
            ScheduleFeed::File(dir.join("schedule.json")),
        );
        let start = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        assert!(matches!(
            source.schedule(start, start).await,
            Err(SourceError::Decode { .. })
        ));
        let _ = fs::remove_dir_all(&dir);
    }
}
