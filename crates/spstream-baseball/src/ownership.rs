// Roster/waiver partitioning and the ownership ceiling.

use std::collections::HashSet;

use serde::Serialize;

use crate::player::{Player, PlayerId};
use crate::snapshot::RosterSnapshot;

/// Which player ids are on the manager's team.
#[derive(Debug, Clone, Default)]
pub struct RosterMembership {
    ids: HashSet<PlayerId>,
}

impl RosterMembership {
    pub fn from_roster(roster: &RosterSnapshot) -> Self {
        Self {
            ids: roster.players.iter().map(|p| p.player_id.clone()).collect(),
        }
    }

    pub fn is_rostered(&self, id: &PlayerId) -> bool {
        self.ids.contains(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PlayerGroup {
    Rostered,
    Waiver,
}

/// Whether a waiver player's ownership clears the ceiling. A threshold of 0
/// disables the filter, unknown ownership included; otherwise ownership must
/// be known and at most `threshold`.
pub fn passes_ownership_ceiling(percent_owned: Option<f64>, threshold: f64) -> bool {
    if threshold <= 0.0 {
        return true;
    }
    percent_owned.is_some_and(|pct| pct <= threshold)
}

/// Decide whether `player` is analyzed at all, and in which group.
///
/// Rostered players always pass. Waiver players need `include_waiver` and
/// an ownership under the ceiling.
pub fn classify(
    player: &Player,
    membership: &RosterMembership,
    min_ownership_pct: f64,
    include_waiver: bool,
) -> Option<PlayerGroup> {
    if membership.is_rostered(&player.player_id) {
        return Some(PlayerGroup::Rostered);
    }
    if include_waiver && passes_ownership_ceiling(player.percent_owned, min_ownership_pct) {
        return Some(PlayerGroup::Waiver);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;
    use crate::snapshot::PlayerRecord;

    fn player(id: &str, pct: Option<f64>) -> Player {
        Player::new(PlayerId::from(id), id, &[Position::StartingPitcher], None, pct)
    }

    fn membership(ids: &[&str]) -> RosterMembership {
        let roster = RosterSnapshot {
            team_key: "t.6".into(),
            players: ids
                .iter()
                .map(|id| PlayerRecord {
                    player_id: PlayerId::from(*id),
                    name: id.to_string(),
                    positions: vec![Position::StartingPitcher],
                    mlb_team: None,
                    percent_owned: None,
                })
                .collect(),
        };
        RosterMembership::from_roster(&roster)
    }

    #[test]
    fn ceiling_is_inclusive() {
        assert!(passes_ownership_ceiling(Some(50.0), 50.0));
        assert!(!passes_ownership_ceiling(Some(50.1), 50.0));
        assert!(passes_ownership_ceiling(Some(100.0), 100.0));
    }

    #[test]
    fn threshold_100_passes_every_known_ownership() {
        for pct in [0.0, 12.5, 50.0, 99.9, 100.0] {
            assert!(passes_ownership_ceiling(Some(pct), 100.0));
        }
        assert!(!passes_ownership_ceiling(None, 100.0));
    }

    #[test]
    fn unknown_ownership_only_passes_zero_threshold() {
        assert!(passes_ownership_ceiling(None, 0.0));
        assert!(!passes_ownership_ceiling(None, 50.0));
        assert!(!passes_ownership_ceiling(None, 1.0));
    }

    #[test]
    fn rostered_players_ignore_ceiling_and_waiver_switch() {
        let m = membership(&["a"]);
        let a = player("a", Some(99.0));
        assert_eq!(classify(&a, &m, 10.0, false), Some(PlayerGroup::Rostered));
        let unknown = player("a", None);
        assert_eq!(classify(&unknown, &m, 10.0, true), Some(PlayerGroup::Rostered));
    }

    #[test]
    fn waiver_players_respect_ceiling_and_switch() {
        let m = membership(&["a"]);
        let low = player("b", Some(12.0));
        let high = player("c", Some(75.0));
        assert_eq!(classify(&low, &m, 50.0, true), Some(PlayerGroup::Waiver));
        assert_eq!(classify(&high, &m, 50.0, true), None);
        assert_eq!(classify(&low, &m, 50.0, false), None);
        assert_eq!(classify(&high, &m, 0.0, true), Some(PlayerGroup::Waiver));
    }

    #[test]
    fn membership_from_roster_ids() {
        let m = membership(&["a", "b", "a"]);
        assert!(m.is_rostered(&PlayerId::from("a")));
        assert!(m.is_rostered(&PlayerId::from("b")));
        assert!(!RosterMembership::default().is_rostered(&PlayerId::from("a")));
    }
}
