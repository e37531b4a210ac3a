// Fantasy-week resolution for the configured target weekdays.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::Serialize;

const WEEK_DAYS: u64 = 7;

/// League week boundaries: week 1 starts on `season_start` and every week is
/// the following 7-day cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeagueCalendar {
    pub season_start: NaiveDate,
}

impl LeagueCalendar {
    pub fn new(season_start: NaiveDate) -> Self {
        Self { season_start }
    }

    /// The weekday every league week starts on.
    pub fn week_start_day(&self) -> Weekday {
        self.season_start.weekday()
    }

    /// Zero-based week index for `date`; negative before the season.
    fn week_index(&self, date: NaiveDate) -> i64 {
        (date - self.season_start).num_days().div_euclid(WEEK_DAYS as i64)
    }

    /// First day of the league week containing `date`.
    pub fn week_start_for(&self, date: NaiveDate) -> NaiveDate {
        let into_week = (date - self.season_start)
            .num_days()
            .rem_euclid(WEEK_DAYS as i64) as u64;
        date.checked_sub_days(Days::new(into_week)).unwrap_or(date)
    }

    /// One-based league week number for `date`, clamped to 1 before the season.
    pub fn week_number(&self, date: NaiveDate) -> u32 {
        let number = self.week_index(date).saturating_add(1).max(1);
        u32::try_from(number).unwrap_or(u32::MAX)
    }
}

/// The scoring period an analysis run targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FantasyWeek {
    pub start_date: NaiveDate,
    /// Inclusive.
    pub end_date: NaiveDate,
    pub week_number: u32,
    /// Target-weekday dates in the window that have not passed, ascending.
    pub target_dates: Vec<NaiveDate>,
}

impl FantasyWeek {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn is_target_date(&self, date: NaiveDate) -> bool {
        self.target_dates.contains(&date)
    }
}

/// Resolve the fantasy week holding the next not-yet-passed occurrence of
/// the target weekdays. Today counts as not passed. When every target day of
/// the current league week is behind `today`, the following week is used.
pub fn resolve_week(
    today: NaiveDate,
    calendar: &LeagueCalendar,
    target_weekdays: &[Weekday],
) -> FantasyWeek {
    let current = week_from(calendar.week_start_for(today), today, calendar, target_weekdays);
    if !current.target_dates.is_empty() || target_weekdays.is_empty() {
        return current;
    }

    match current.start_date.checked_add_days(Days::new(WEEK_DAYS)) {
        Some(next_start) => week_from(next_start, today, calendar, target_weekdays),
        None => current,
    }
}

fn week_from(
    start_date: NaiveDate,
    today: NaiveDate,
    calendar: &LeagueCalendar,
    target_weekdays: &[Weekday],
) -> FantasyWeek {
    let end_date = start_date
        .checked_add_days(Days::new(WEEK_DAYS - 1))
        .unwrap_or(NaiveDate::MAX);
    let target_dates = start_date
        .iter_days()
        .take_while(|d| *d <= end_date)
        .filter(|d| *d >= today && target_weekdays.contains(&d.weekday()))
        .collect();
    FantasyWeek {
        start_date,
        end_date,
        week_number: calendar.week_number(start_date),
        target_dates,
    }
}
