// MLB Stats API schedule client and decoder.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use spstream_baseball::player::PlayerId;
use spstream_baseball::snapshot::{HomeOrAway, ScheduleSnapshot, ScheduledStart, TeamGame};
use spstream_baseball::source::SourceError;
use tracing::{debug, info};

/// MLB's sport id for the major leagues.
const MLB_SPORT_ID: &str = "1";

// ---------------------------------------------------------------------------
// Raw serde structs (private) for /schedule?hydrate=probablePitcher,team
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawSchedule {
    #[serde(default)]
    dates: Vec<RawDate>,
}

#[derive(Debug, Deserialize)]
struct RawDate {
    date: NaiveDate,
    #[serde(default)]
    games: Vec<RawGame>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGame {
    #[serde(default)]
    official_date: Option<NaiveDate>,
    #[serde(default)]
    status: Option<RawStatus>,
    teams: RawTeams,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStatus {
    #[serde(default)]
    detailed_state: String,
}

#[derive(Debug, Deserialize)]
struct RawTeams {
    away: RawSide,
    home: RawSide,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSide {
    team: RawTeam,
    #[serde(default)]
    probable_pitcher: Option<RawPitcher>,
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    name: String,
    #[serde(default)]
    abbreviation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPitcher {
    id: u64,
    full_name: String,
}

impl RawTeam {
    fn label(&self) -> &str {
        self.abbreviation.as_deref().unwrap_or(&self.name)
    }
}

impl RawGame {
    fn is_called_off(&self) -> bool {
        self.status.as_ref().is_some_and(|s| {
            matches!(s.detailed_state.as_str(), "Postponed" | "Cancelled")
        })
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a schedule response into a snapshot, keeping games dated within
/// `[start, end]`. Postponed and cancelled games are dropped. Starts are
/// numbered in document order, so a later listing of the same pitcher on
/// the same date supersedes an earlier one.
pub fn decode_schedule(
    json: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ScheduleSnapshot, serde_json::Error> {
    let raw: RawSchedule = serde_json::from_str(json)?;

    let mut snapshot = ScheduleSnapshot::default();
    let mut seq = 0u64;
    for day in raw.dates {
        for game in day.games {
            let game_date = game.official_date.unwrap_or(day.date);
            if game_date < start || game_date > end {
                continue;
            }
            if game.is_called_off() {
                debug!(%game_date, "skipping called-off game");
                continue;
            }

            let sides = [
                (&game.teams.home, &game.teams.away, HomeOrAway::Home),
                (&game.teams.away, &game.teams.home, HomeOrAway::Away),
            ];
            for (side, other, home_or_away) in sides {
                snapshot.team_games.push(TeamGame {
                    team: side.team.label().to_string(),
                    game_date,
                });
                if let Some(pitcher) = &side.probable_pitcher {
                    snapshot.starts.push(ScheduledStart {
                        player_id: PlayerId::mlb(pitcher.id),
                        name: pitcher.full_name.clone(),
                        mlb_team: Some(side.team.label().to_string()),
                        game_date,
                        opponent: other.team.label().to_string(),
                        home_or_away,
                        fetch_seq: seq,
                    });
                    seq += 1;
                }
            }
        }
    }
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Reads probable pitchers from the public MLB Stats API.
pub struct MlbScheduleClient {
    http: reqwest::Client,
    base_url: String,
}

impl MlbScheduleClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http {
                url: base_url.to_string(),
                message: format!("failed to build client: {e}"),
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn fetch_schedule(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<ScheduleSnapshot, SourceError> {
        let url = format!("{}/schedule", self.base_url);
        let query: HashMap<&str, String> = HashMap::from([
            ("sportId", MLB_SPORT_ID.to_string()),
            ("startDate", start.to_string()),
            ("endDate", end.to_string()),
            ("hydrate", "probablePitcher,team".to_string()),
        ]);

        let http_err = |e: reqwest::Error| SourceError::Http {
            url: url.clone(),
            message: e.to_string(),
        };
        let body = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(http_err)?
            .text()
            .await
            .map_err(http_err)?;

        let snapshot = decode_schedule(&body, start, end).map_err(|e| SourceError::Decode {
            what: "MLB schedule response".into(),
            message: e.to_string(),
        })?;
        info!(
            "MLB schedule {}..{}: {} probable starts, {} team games",
            start,
            end,
            snapshot.starts.len(),
            snapshot.team_games.len()
        );
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
