// Analysis engine: turns fetched snapshots into ranked streaming recommendations.
//
// Pure and synchronous. Resolves the fantasy week, merges identities, filters
// by roster membership and ownership, detects second starts, and orders the
// result with rostered pitchers first.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use spstream_core::cache::Stamped;
use spstream_core::config::AnalysisSettings;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::normalize::{normalize, url_slug};
use crate::ownership::{classify, PlayerGroup, RosterMembership};
use crate::player::{Player, PlayerId};
use crate::snapshot::{OwnershipSnapshot, RosterSnapshot, ScheduleSnapshot, ScheduledStart};
use crate::starts::{detect_starts, project_rotation_start};
use crate::window::{resolve_week, FantasyWeek, LeagueCalendar};

pub const TWO_START_NOTE: &str = "Two-start pitcher — high priority";
pub const LOW_OWNED_NOTE: &str = "Low-owned option";

const SAVANT_PLAYER_URL: &str = "https://baseballsavant.mlb.com/savant-player";

/// Rank bonus separating two-start pitchers from single-start ones. Larger
/// than the whole ownership range so tiers never overlap.
const SECOND_START_TIER: f64 = 200.0;

// ---------------------------------------------------------------------------
// Output records
// ---------------------------------------------------------------------------

/// Recommendation for one pitcher with at least one confirmed start.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitcherAnalysis {
    pub player: Player,
    /// Target-day start dates in the window, ascending. Never empty.
    pub confirmed_dates: Vec<NaiveDate>,
    pub is_potential_second_start: bool,
    pub is_rostered: bool,
    pub recommendation_note: String,
    /// Ordering key only; higher ranks first.
    pub rank_score: f64,
    /// The deduplicated starts behind `confirmed_dates`.
    pub starts: Vec<ScheduledStart>,
    /// In-window starts on non-target days.
    pub context_starts: Vec<ScheduledStart>,
    /// Next rotation turn, when it lands inside the week. Informational.
    pub projected_second_start: Option<NaiveDate>,
    /// Baseball Savant profile, when the schedule feed gave an MLB id.
    pub savant_url: Option<String>,
}

/// One analysis run. Rostered pitchers come first, then waiver pitchers;
/// each group is ordered by rank descending, then name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub fantasy_week: FantasyWeek,
    pub pitchers: Vec<PitcherAnalysis>,
    pub generated_at: DateTime<Utc>,
    pub total_found: usize,
}

impl AnalysisResult {
    fn split(&self) -> usize {
        self.pitchers.partition_point(|p| p.is_rostered)
    }

    pub fn rostered(&self) -> &[PitcherAnalysis] {
        &self.pitchers[..self.split()]
    }

    pub fn waiver(&self) -> &[PitcherAnalysis] {
        &self.pitchers[self.split()..]
    }

    pub fn is_empty(&self) -> bool {
        self.pitchers.is_empty()
    }
}

impl Stamped for AnalysisResult {
    fn stamp(&mut self, at: DateTime<Utc>) {
        self.generated_at = at;
    }
}

// ---------------------------------------------------------------------------
// Scoring and notes
// ---------------------------------------------------------------------------

/// Two-start pitchers outrank single-start ones; within a tier lower
/// ownership ranks higher. Unknown ownership ranks as fully owned.
pub fn rank_score(is_potential_second_start: bool, percent_owned: Option<f64>) -> f64 {
    let tier = if is_potential_second_start {
        SECOND_START_TIER
    } else {
        0.0
    };
    tier + (100.0 - percent_owned.unwrap_or(100.0))
}

pub fn recommendation_note(
    is_potential_second_start: bool,
    percent_owned: Option<f64>,
    low_ownership_pct: f64,
    first_start: &ScheduledStart,
) -> String {
    if is_potential_second_start {
        return TWO_START_NOTE.to_string();
    }
    if percent_owned.is_some_and(|pct| pct < low_ownership_pct) {
        return LOW_OWNED_NOTE.to_string();
    }
    format!(
        "Confirmed start: {} {} {}",
        first_start.game_date.format("%a %b %-d"),
        first_start.home_or_away.matchup_prefix(),
        first_start.opponent
    )
}

/// Baseball Savant profile link for a schedule-feed pitcher. `None` unless
/// `schedule_id` is an `mlb.<id>` key.
pub fn savant_url(name: &str, schedule_id: &PlayerId) -> Option<String> {
    let mlb_id = schedule_id.mlb_id()?;
    let slug = url_slug(name);
    if slug.is_empty() {
        return None;
    }
    Some(format!("{SAVANT_PLAYER_URL}/{slug}-{mlb_id}"))
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Analyze one run's snapshots.
///
/// Fails only on invalid settings. An empty schedule is a successful,
/// empty result. `generated_at` is recorded as given.
pub fn analyze(
    today: NaiveDate,
    calendar: &LeagueCalendar,
    roster: &RosterSnapshot,
    ownership: &OwnershipSnapshot,
    schedule: &ScheduleSnapshot,
    settings: &AnalysisSettings,
    generated_at: DateTime<Utc>,
) -> Result<AnalysisResult, AnalysisError> {
    settings.validate()?;

    let fantasy_week = resolve_week(today, calendar, &settings.target_weekdays);
    debug!(
        week = fantasy_week.week_number,
        start = %fantasy_week.start_date,
        end = %fantasy_week.end_date,
        "resolved fantasy week"
    );

    if schedule.is_empty() {
        info!(week = fantasy_week.week_number, "no probable starters announced");
        return Ok(AnalysisResult {
            fantasy_week,
            pitchers: Vec::new(),
            generated_at,
            total_found: 0,
        });
    }

    let feeds = normalize(roster, ownership, schedule);
    let membership = RosterMembership::from_roster(roster);

    let mut starts_by_player: BTreeMap<&PlayerId, Vec<&ScheduledStart>> = BTreeMap::new();
    for start in &schedule.starts {
        if let Some(id) = feeds.canonical_id(&start.player_id) {
            starts_by_player.entry(id).or_default().push(start);
        }
    }

    let mut pitchers = Vec::new();
    for (id, starts) in starts_by_player {
        let Some(player) = feeds.players.get(id) else {
            continue;
        };
        let Some(group) = classify(
            player,
            &membership,
            settings.min_ownership_pct,
            settings.include_waiver,
        ) else {
            debug!(player = %player.name, "filtered by ownership");
            continue;
        };

        let summary = detect_starts(starts, &fantasy_week, settings.detect_second_starts);
        let Some(first) = summary.confirmed.first() else {
            continue;
        };

        let is_potential_second_start = summary.is_potential_second_start();
        let projected_second_start = if settings.detect_second_starts && !is_potential_second_start {
            first.mlb_team.as_deref().and_then(|team| {
                project_rotation_start(
                    first.game_date,
                    &schedule.game_dates(team),
                    fantasy_week.end_date,
                )
            })
        } else {
            None
        };

        let note = recommendation_note(
            is_potential_second_start,
            player.percent_owned,
            settings.low_ownership_pct,
            first,
        );
        let savant_url = savant_url(&first.name, &first.player_id);

        pitchers.push(PitcherAnalysis {
            player: player.clone(),
            confirmed_dates: summary.confirmed_dates(),
            is_potential_second_start,
            is_rostered: group == PlayerGroup::Rostered,
            recommendation_note: note,
            rank_score: rank_score(is_potential_second_start, player.percent_owned),
            starts: summary.confirmed,
            context_starts: summary.context,
            projected_second_start,
            savant_url,
        });
    }

    pitchers.sort_by(compare_for_display);

    let total_found = pitchers.len();
    info!(
        week = fantasy_week.week_number,
        total_found,
        conflicts = feeds.conflicts.len(),
        "analysis complete"
    );

    Ok(AnalysisResult {
        fantasy_week,
        pitchers,
        generated_at,
        total_found,
    })
}

fn compare_for_display(a: &PitcherAnalysis, b: &PitcherAnalysis) -> Ordering {
    b.is_rostered
        .cmp(&a.is_rostered)
        .then_with(|| b.rank_score.total_cmp(&a.rank_score))
        .then_with(|| a.player.name.cmp(&b.player.name))
        .then_with(|| a.player.player_id.cmp(&b.player.player_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
