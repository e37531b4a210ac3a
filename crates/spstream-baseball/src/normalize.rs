// Identity normalization: merge roster, ownership, and schedule records into
// one canonical player per identity.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::player::{Player, PlayerId, Position};
use crate::snapshot::{
    OwnershipSnapshot, PlayerRecord, RosterSnapshot, ScheduleSnapshot, ScheduledStart,
};

// ---------------------------------------------------------------------------
// Name normalization
// ---------------------------------------------------------------------------

const GENERATIONAL_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

/// Matching key for a display name: ASCII-folded, lowercase, punctuation
/// stripped, words joined by single hyphens, generational suffix dropped.
///
/// `"José Ramírez Jr."` becomes `"jose-ramirez"`.
pub fn normalize_name(name: &str) -> String {
    let folded = fold_words(name);
    let mut words: Vec<&str> = folded.split_whitespace().collect();
    if words.len() > 1 && words.last().is_some_and(|w| GENERATIONAL_SUFFIXES.contains(w)) {
        words.pop();
    }
    words.join("-")
}

/// URL slug for a display name. Like [`normalize_name`] but keeps the
/// suffix: `"Bobby Witt Jr."` becomes `"bobby-witt-jr"`.
pub fn url_slug(name: &str) -> String {
    fold_words(name).split_whitespace().collect::<Vec<_>>().join("-")
}

/// Lowercase ASCII letters and digits, with separators turned into spaces.
fn fold_words(name: &str) -> String {
    let mut folded = String::with_capacity(name.len());
    for ch in name.chars().flat_map(char::to_lowercase) {
        match fold_char(ch) {
            Some(s) => folded.push_str(s),
            None if ch.is_ascii_alphanumeric() => folded.push(ch),
            None if ch.is_whitespace() || ch == '-' || ch == '_' => folded.push(' '),
            None => {}
        }
    }
    folded
}

fn fold_char(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' => "a",
        'æ' => "ae",
        'ç' | 'č' | 'ć' => "c",
        'é' | 'è' | 'ê' | 'ë' | 'ē' | 'ě' => "e",
        'í' | 'ì' | 'î' | 'ï' | 'ī' => "i",
        'ñ' | 'ń' | 'ň' => "n",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' => "o",
        'œ' => "oe",
        'ú' | 'ù' | 'û' | 'ü' | 'ū' | 'ů' => "u",
        'ý' | 'ÿ' => "y",
        'š' | 'ś' => "s",
        'ž' | 'ź' | 'ż' => "z",
        'ř' => "r",
        'ł' => "l",
        'ß' => "ss",
        _ => return None,
    };
    Some(folded)
}

// ---------------------------------------------------------------------------
// Conflicts
// ---------------------------------------------------------------------------

/// A non-fatal disagreement between feeds, resolved in favor of the
/// league's identity data.
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityConflict {
    /// Two feeds used the same id for players whose names do not match.
    NameMismatch {
        player_id: PlayerId,
        kept: String,
        rejected: String,
    },
    /// A schedule name matched more than one league record.
    AmbiguousName {
        schedule_id: PlayerId,
        name: String,
        candidates: Vec<PlayerId>,
    },
    /// Two schedule ids matched the same league player by name. Only `kept`
    /// is attached to it.
    SharedName {
        player_id: PlayerId,
        name: String,
        kept: PlayerId,
        rejected: PlayerId,
    },
}

impl fmt::Display for IdentityConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityConflict::NameMismatch {
                player_id,
                kept,
                rejected,
            } => write!(f, "{player_id}: kept \"{kept}\", ignored \"{rejected}\""),
            IdentityConflict::AmbiguousName {
                schedule_id,
                name,
                candidates,
            } => {
                let ids: Vec<&str> = candidates.iter().map(PlayerId::as_str).collect();
                write!(
                    f,
                    "{schedule_id}: \"{name}\" matches {} league players ({})",
                    candidates.len(),
                    ids.join(", ")
                )
            }
            IdentityConflict::SharedName {
                player_id,
                name,
                kept,
                rejected,
            } => write!(
                f,
                "{player_id}: \"{name}\" from {rejected} also matches, already taken by {kept}"
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct NormalizedFeeds {
    /// One entry per canonical identity.
    pub players: BTreeMap<PlayerId, Player>,
    /// Schedule id to canonical id, for every schedule record seen.
    pub schedule_ids: HashMap<PlayerId, PlayerId>,
    pub conflicts: Vec<IdentityConflict>,
}

impl NormalizedFeeds {
    /// Canonical id for a schedule-feed id.
    pub fn canonical_id(&self, schedule_id: &PlayerId) -> Option<&PlayerId> {
        self.schedule_ids.get(schedule_id)
    }
}

/// Merge the three feeds into canonical players.
///
/// Roster records define identity first, then ownership records for anyone
/// not on the roster. Ownership percentages come from the ownership feed,
/// falling back to the roster's own figure. Schedule records attach by id,
/// then by a unique normalized name among pitchers, and otherwise become
/// schedule-only players with unknown ownership.
///
/// A league player takes at most one schedule id: an exact id match first,
/// then a name match from the player's own club, then the first name match
/// seen. Other schedule ids sharing the name stay separate.
pub fn normalize(
    roster: &RosterSnapshot,
    ownership: &OwnershipSnapshot,
    schedule: &ScheduleSnapshot,
) -> NormalizedFeeds {
    let mut out = NormalizedFeeds::default();

    let mut ownership_pct: HashMap<&PlayerId, f64> = HashMap::new();
    for rec in &ownership.players {
        if let Some(pct) = rec.percent_owned {
            ownership_pct.insert(&rec.player_id, pct);
        }
    }

    for rec in roster.players.iter().chain(ownership.players.iter()) {
        if let Some(existing) = out.players.get(&rec.player_id) {
            check_names(&mut out.conflicts, existing, &rec.player_id, &rec.name);
            continue;
        }
        let pct = ownership_pct
            .get(&rec.player_id)
            .copied()
            .or(rec.percent_owned);
        out.players
            .insert(rec.player_id.clone(), player_from_record(rec, pct));
    }

    // Only pitchers can take a probable start.
    let mut by_name: HashMap<String, Vec<PlayerId>> = HashMap::new();
    for (id, player) in &out.players {
        if !player.is_pitcher() {
            continue;
        }
        by_name
            .entry(normalize_name(&player.name))
            .or_default()
            .push(id.clone());
    }

    // Name matches are settled after every schedule id has been seen, so one
    // league player never absorbs two MLB pitchers.
    let mut claims: BTreeMap<PlayerId, Vec<&ScheduledStart>> = BTreeMap::new();
    let mut seen: HashSet<&PlayerId> = HashSet::new();

    for start in &schedule.starts {
        if !seen.insert(&start.player_id) {
            continue;
        }

        if let Some(existing) = out.players.get(&start.player_id) {
            check_names(&mut out.conflicts, existing, &start.player_id, &start.name);
            out.schedule_ids
                .insert(start.player_id.clone(), start.player_id.clone());
            continue;
        }

        let key = normalize_name(&start.name);
        match by_name.get(&key).map(Vec::as_slice) {
            Some([only]) => {
                claims.entry(only.clone()).or_default().push(start);
            }
            Some(candidates) if candidates.len() > 1 => {
                let conflict = IdentityConflict::AmbiguousName {
                    schedule_id: start.player_id.clone(),
                    name: start.name.clone(),
                    candidates: candidates.to_vec(),
                };
                warn!(%conflict, "ambiguous name; treating as schedule-only player");
                out.conflicts.push(conflict);
                insert_schedule_only(&mut out, start);
            }
            _ => insert_schedule_only(&mut out, start),
        }
    }

    for (player_id, claimants) in claims {
        let taken_by_id = out.schedule_ids.get(&player_id) == Some(&player_id);
        let winner = if taken_by_id {
            None
        } else {
            let team = out.players.get(&player_id).and_then(|p| p.mlb_team.as_deref());
            let pick = claimants
                .iter()
                .position(|s| same_team(team, s.mlb_team.as_deref()))
                .unwrap_or(0);
            Some(claimants[pick])
        };

        if let Some(start) = winner {
            debug!(schedule_id = %start.player_id, %player_id, "matched by name");
            out.schedule_ids
                .insert(start.player_id.clone(), player_id.clone());
        }

        let kept = winner.map_or(&player_id, |s| &s.player_id);
        for start in claimants {
            if winner.is_some_and(|w| w.player_id == start.player_id) {
                continue;
            }
            let conflict = IdentityConflict::SharedName {
                player_id: player_id.clone(),
                name: start.name.clone(),
                kept: kept.clone(),
                rejected: start.player_id.clone(),
            };
            warn!(%conflict, "name already claimed; treating as schedule-only player");
            out.conflicts.push(conflict);
            insert_schedule_only(&mut out, start);
        }
    }

    out
}

fn same_team(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a.eq_ignore_ascii_case(b))
}

fn player_from_record(rec: &PlayerRecord, percent_owned: Option<f64>) -> Player {
    Player::new(
        rec.player_id.clone(),
        rec.name.clone(),
        &rec.positions,
        rec.mlb_team.clone(),
        percent_owned,
    )
}

fn insert_schedule_only(out: &mut NormalizedFeeds, start: &ScheduledStart) {
    let id = start.player_id.clone();
    out.players.entry(id.clone()).or_insert_with(|| {
        Player::new(
            id.clone(),
            start.name.clone(),
            &[Position::StartingPitcher],
            start.mlb_team.clone(),
            None,
        )
    });
    out.schedule_ids.insert(id.clone(), id);
}

fn check_names(
    conflicts: &mut Vec<IdentityConflict>,
    existing: &Player,
    id: &PlayerId,
    other_name: &str,
) {
    if normalize_name(&existing.name) != normalize_name(other_name) {
        let conflict = IdentityConflict::NameMismatch {
            player_id: id.clone(),
            kept: existing.name.clone(),
            rejected: other_name.to_string(),
        };
        warn!(%conflict, "feed id collision");
        conflicts.push(conflict);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
