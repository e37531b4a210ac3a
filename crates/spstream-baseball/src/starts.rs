// Second-start detection over one pitcher's announced starts.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::snapshot::ScheduledStart;
use crate::window::FantasyWeek;

/// Starters in a five-man rotation pitch every fifth team game.
pub const ROTATION_LENGTH: usize = 5;

/// A pitcher's starts classified against one fantasy week.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StartSummary {
    /// Starts on pending target dates, ascending by date.
    pub confirmed: Vec<ScheduledStart>,
    /// Other in-window starts. Recorded, never counted.
    pub context: Vec<ScheduledStart>,
}

impl StartSummary {
    pub fn confirmed_dates(&self) -> Vec<NaiveDate> {
        self.confirmed.iter().map(|s| s.game_date).collect()
    }

    pub fn is_potential_second_start(&self) -> bool {
        self.confirmed.len() >= 2
    }
}

/// Collapse entries that share a game date. The entry with the highest
/// `fetch_seq` wins; on equal sequence the later entry in the input wins.
/// Output is ascending by date.
pub fn dedupe_same_day<'a, I>(starts: I) -> Vec<&'a ScheduledStart>
where
    I: IntoIterator<Item = &'a ScheduledStart>,
{
    let mut by_date: BTreeMap<NaiveDate, &ScheduledStart> = BTreeMap::new();
    for start in starts {
        by_date
            .entry(start.game_date)
            .and_modify(|kept| {
                if start.fetch_seq >= kept.fetch_seq {
                    *kept = start;
                }
            })
            .or_insert(start);
    }
    by_date.into_values().collect()
}

/// Classify one pitcher's starts against `week`.
///
/// Same-date duplicates count once. With `detect_second_starts` off only the
/// earliest confirmed start is kept, so the pitcher can never be flagged as
/// a two-start option.
pub fn detect_starts<'a, I>(starts: I, week: &FantasyWeek, detect_second_starts: bool) -> StartSummary
where
    I: IntoIterator<Item = &'a ScheduledStart>,
{
    let mut summary = StartSummary::default();
    for start in dedupe_same_day(starts) {
        if !week.contains(start.game_date) {
            continue;
        }
        if week.is_target_date(start.game_date) {
            summary.confirmed.push(start.clone());
        } else {
            summary.context.push(start.clone());
        }
    }
    if !detect_second_starts {
        summary.confirmed.truncate(1);
    }
    summary
}

/// Project the pitcher's next turn after `first_start` from the club's game
/// dates: the fifth team game after the start. Returns it only when it falls
/// on or before `week_end`.
pub fn project_rotation_start(
    first_start: NaiveDate,
    team_game_dates: &[NaiveDate],
    week_end: NaiveDate,
) -> Option<NaiveDate> {
    let mut later: Vec<NaiveDate> = team_game_dates
        .iter()
        .copied()
        .filter(|d| *d > first_start)
        .collect();
    later.sort();
    later
        .get(ROTATION_LENGTH - 1)
        .copied()
        .filter(|d| *d <= week_end)
}
