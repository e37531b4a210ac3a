// CSV loaders for the roster and ownership snapshots.
//
// Both files share one layout:
//   player_id,name,positions,mlb_team,percent_owned
// Positions are `/`-separated ("SP/RP"). Empty team or ownership cells are
// allowed; malformed rows are skipped with a warning.

use std::io::Read;

use serde::Deserialize;
use spstream_baseball::player::{PlayerId, Position};
use spstream_baseball::snapshot::{OwnershipSnapshot, PlayerRecord, RosterSnapshot};
use spstream_baseball::source::SourceError;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Raw CSV serde struct (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    player_id: String,
    name: String,
    #[serde(default)]
    positions: String,
    #[serde(default)]
    mlb_team: String,
    #[serde(default)]
    percent_owned: Option<f64>,
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerRecord>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    for result in reader.deserialize::<RawPlayerRow>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        };

        let player_id = raw.player_id.trim();
        let name = raw.name.trim();
        if player_id.is_empty() || name.is_empty() {
            warn!("skipping player row with blank id or name");
            continue;
        }

        let percent_owned = match raw.percent_owned {
            Some(pct) if pct.is_finite() && (0.0..=100.0).contains(&pct) => Some(pct),
            Some(pct) => {
                warn!("'{}': ownership {} out of range; treating as unknown", name, pct);
                None
            }
            None => None,
        };

        let team = raw.mlb_team.trim();
        players.push(PlayerRecord {
            player_id: PlayerId::new(player_id),
            name: name.to_string(),
            positions: Position::parse_list(&raw.positions),
            mlb_team: (!team.is_empty()).then(|| team.to_string()),
            percent_owned,
        });
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Public loaders
// ---------------------------------------------------------------------------

pub fn parse_roster<R: Read>(
    rdr: R,
    team_key: &str,
    what: &str,
) -> Result<RosterSnapshot, SourceError> {
    let players = load_players_from_reader(rdr).map_err(|e| decode_error(what, e))?;
    info!("Loaded {} roster players from {}", players.len(), what);
    Ok(RosterSnapshot {
        team_key: team_key.to_string(),
        players,
    })
}

pub fn parse_ownership<R: Read>(rdr: R, what: &str) -> Result<OwnershipSnapshot, SourceError> {
    let players = load_players_from_reader(rdr).map_err(|e| decode_error(what, e))?;
    info!("Loaded {} ownership rows from {}", players.len(), what);
    Ok(OwnershipSnapshot { players })
}

fn decode_error(what: &str, e: csv::Error) -> SourceError {
    SourceError::Decode {
        what: what.to_string(),
        message: e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
