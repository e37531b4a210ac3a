// Raw feed snapshots handed to the analysis engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::player::{PlayerId, Position};

/// One player row as reported by the fantasy league (roster or ownership feed).
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRecord {
    pub player_id: PlayerId,
    pub name: String,
    pub positions: Vec<Position>,
    pub mlb_team: Option<String>,
    pub percent_owned: Option<f64>,
}

/// The manager's current roster.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RosterSnapshot {
    pub team_key: String,
    pub players: Vec<PlayerRecord>,
}

/// League-wide ownership, including free agents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnershipSnapshot {
    pub players: Vec<PlayerRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HomeOrAway {
    Home,
    Away,
}

impl HomeOrAway {
    /// "vs" for home games, "@" for road games.
    pub fn matchup_prefix(&self) -> &'static str {
        match self {
            HomeOrAway::Home => "vs",
            HomeOrAway::Away => "@",
        }
    }
}

/// One announced probable start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledStart {
    pub player_id: PlayerId,
    /// Name as announced by the schedule feed.
    pub name: String,
    /// The pitcher's own club.
    pub mlb_team: Option<String>,
    pub game_date: NaiveDate,
    pub opponent: String,
    pub home_or_away: HomeOrAway,
    /// Fetch order within the snapshot; a higher value is a later update.
    pub fetch_seq: u64,
}

/// A game on a club's schedule, announced starter or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamGame {
    pub team: String,
    pub game_date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleSnapshot {
    pub starts: Vec<ScheduledStart>,
    pub team_games: Vec<TeamGame>,
}

impl ScheduleSnapshot {
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Every game date for `team`, ascending. Doubleheaders appear twice.
    pub fn game_dates(&self, team: &str) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self
            .team_games
            .iter()
            .filter(|g| g.team == team)
            .map(|g| g.game_date)
            .collect();
        dates.sort();
        dates
    }
}
