// Canonical player identity and fantasy positions.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Stable player identifier. Fantasy-league ids look like `458.p.9124`;
/// schedule-only pitchers carry an `mlb.<id>` key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Key for a pitcher known only to the MLB schedule feed.
    pub fn mlb(mlb_id: u64) -> Self {
        Self(format!("mlb.{mlb_id}"))
    }

    /// The MLB Stats API id, for `mlb.<id>` keys.
    pub fn mlb_id(&self) -> Option<u64> {
        self.0.strip_prefix("mlb.")?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Fantasy-eligible playing positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    ShortStop,
    Outfield,
    LeftField,
    CenterField,
    RightField,
    DesignatedHitter,
    StartingPitcher,
    ReliefPitcher,
    Pitcher,
}

impl Position {
    /// Parse a position abbreviation, case-insensitively.
    ///
    /// Returns `None` for anything that is not a playing position, including
    /// lineup meta slots like UTIL, BN or IL.
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" | "CA" => Some(Position::Catcher),
            "1B" => Some(Position::FirstBase),
            "2B" => Some(Position::SecondBase),
            "3B" => Some(Position::ThirdBase),
            "SS" => Some(Position::ShortStop),
            "OF" => Some(Position::Outfield),
            "LF" => Some(Position::LeftField),
            "CF" => Some(Position::CenterField),
            "RF" => Some(Position::RightField),
            "DH" => Some(Position::DesignatedHitter),
            "SP" => Some(Position::StartingPitcher),
            "RP" => Some(Position::ReliefPitcher),
            "P" => Some(Position::Pitcher),
            _ => None,
        }
    }

    fn is_meta_slot_str(s: &str) -> bool {
        matches!(
            s.trim().to_uppercase().as_str(),
            "UTIL" | "BN" | "BE" | "IL" | "IL+" | "DL" | "NA"
        )
    }

    /// Parse a `/`- or `,`-separated position list ("SP/RP") into a
    /// display-ordered, deduplicated list. Meta slots are skipped silently;
    /// anything else unrecognized is logged and dropped.
    pub fn parse_list(raw: &str) -> Vec<Position> {
        let mut positions: Vec<Position> = raw
            .split(['/', ','])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| match Position::from_str_pos(s) {
                Some(pos) => Some(pos),
                None => {
                    if !Position::is_meta_slot_str(s) {
                        warn!(position = s, "dropping unknown position");
                    }
                    None
                }
            })
            .collect();
        positions.sort_by_key(Position::sort_order);
        positions.dedup();
        positions
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::ShortStop => "SS",
            Position::Outfield => "OF",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
            Position::DesignatedHitter => "DH",
            Position::StartingPitcher => "SP",
            Position::ReliefPitcher => "RP",
            Position::Pitcher => "P",
        }
    }

    pub fn is_pitcher(&self) -> bool {
        matches!(
            self,
            Position::StartingPitcher | Position::ReliefPitcher | Position::Pitcher
        )
    }

    /// Deterministic ordering index for display.
    pub fn sort_order(&self) -> u8 {
        match self {
            Position::Catcher => 0,
            Position::FirstBase => 1,
            Position::SecondBase => 2,
            Position::ThirdBase => 3,
            Position::ShortStop => 4,
            Position::Outfield => 5,
            Position::LeftField => 6,
            Position::CenterField => 7,
            Position::RightField => 8,
            Position::DesignatedHitter => 9,
            Position::StartingPitcher => 10,
            Position::ReliefPitcher => 11,
            Position::Pitcher => 12,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// One canonical player, built fresh for every analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub player_id: PlayerId,
    /// Display name with the feed's original casing.
    pub name: String,
    /// Never empty; display-ordered and deduplicated.
    pub positions: Vec<Position>,
    pub mlb_team: Option<String>,
    /// `None` means the league reported no ownership for this player.
    pub percent_owned: Option<f64>,
}

impl Player {
    pub fn new(
        player_id: PlayerId,
        name: impl Into<String>,
        positions: &[Position],
        mlb_team: Option<String>,
        percent_owned: Option<f64>,
    ) -> Self {
        let mut positions = positions.to_vec();
        positions.sort_by_key(Position::sort_order);
        positions.dedup();
        if positions.is_empty() {
            positions.push(Position::Pitcher);
        }
        Self {
            player_id,
            name: name.into(),
            positions,
            mlb_team,
            percent_owned,
        }
    }

    /// Eligible at any pitching position. Probable starters only ever
    /// match pitchers.
    pub fn is_pitcher(&self) -> bool {
        self.positions.iter().any(Position::is_pitcher)
    }

    /// "SP/RP"-style position string.
    pub fn positions_display(&self) -> String {
        self.positions
            .iter()
            .map(Position::display_str)
            .collect::<Vec<_>>()
            .join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_pos_is_case_insensitive() {
        assert_eq!(Position::from_str_pos("sp"), Some(Position::StartingPitcher));
        assert_eq!(Position::from_str_pos(" Rp "), Some(Position::ReliefPitcher));
        assert_eq!(Position::from_str_pos("of"), Some(Position::Outfield));
        assert_eq!(Position::from_str_pos("UTIL"), None);
        assert_eq!(Position::from_str_pos("XX"), None);
    }

    #[test]
    fn parse_list_orders_and_dedups() {
        let positions = Position::parse_list("RP/SP/SP");
        assert_eq!(
            positions,
            vec![Position::StartingPitcher, Position::ReliefPitcher]
        );
    }

    #[test]
    fn parse_list_skips_meta_and_unknown() {
        let positions = Position::parse_list("SP, BN, IL, ZZ");
        assert_eq!(positions, vec![Position::StartingPitcher]);
        assert!(Position::parse_list("").is_empty());
    }

    #[test]
    fn position_order_does_not_affect_player_equality() {
        let a = Player::new(
            PlayerId::from("458.p.1"),
            "Logan Webb",
            &[Position::ReliefPitcher, Position::StartingPitcher],
            None,
            Some(90.0),
        );
        let b = Player::new(
            PlayerId::from("458.p.1"),
            "Logan Webb",
            &[Position::StartingPitcher, Position::ReliefPitcher],
            None,
            Some(90.0),
        );
        assert_eq!(a, b);
        assert_eq!(a.positions_display(), "SP/RP");
    }

    #[test]
    fn player_without_positions_defaults_to_pitcher() {
        let p = Player::new(PlayerId::mlb(657277), "Logan Webb", &[], None, None);
        assert_eq!(p.positions, vec![Position::Pitcher]);
        assert_eq!(p.player_id.as_str(), "mlb.657277");
        assert!(p.is_pitcher());
    }

    #[test]
    fn mlb_id_only_for_schedule_keys() {
        assert_eq!(PlayerId::mlb(657277).mlb_id(), Some(657277));
        assert_eq!(PlayerId::from("458.p.9124").mlb_id(), None);
        assert_eq!(PlayerId::from("mlb.abc").mlb_id(), None);
    }

    #[test]
    fn hitters_are_not_pitchers() {
        let catcher = Player::new(
            PlayerId::from("458.p.9"),
            "Will Smith",
            &[Position::Catcher],
            None,
            None,
        );
        assert!(!catcher.is_pitcher());
        let two_way = Player::new(
            PlayerId::from("458.p.10"),
            "Shohei Ohtani",
            &[Position::DesignatedHitter, Position::StartingPitcher],
            None,
            None,
        );
        assert!(two_way.is_pitcher());
    }
}
