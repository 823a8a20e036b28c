//! League lifecycle as seen by a viewer.
//!
//! The escrow contract owns every transition; this module only reconstructs
//! which phase a league is in and which actions the viewer may take from the
//! latest snapshot and the wall clock.
//!
//! # Phase Flow
//!
//! ```text
//! Created ──────────────→ Cancelled
//!     ↓ (start early / last slot filled)
//! Active ─── now >= end_time ──→ settle ──→ Settled
//!     └──────────────────────────────────→ Cancelled
//! ```
//!
//! Every offered action is gated on a single phase, so at most one phase's
//! actions are offered at any time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    estimated_pot, house_cut, Address, CoreError, Entry, League, LeagueAction, LeagueStatus,
    MAX_HOUSE_CUT_BPS,
};

/// Minimum players before the creator may start a league early.
pub const MIN_PLAYERS_TO_START: usize = 2;

/// Everything read from the escrow contract for one league.
///
/// `entries` and `winners` are `None` while their reads are still in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub league: League,
    #[serde(default)]
    pub entries: Option<Vec<Entry>>,
    #[serde(default)]
    pub winners: Option<Vec<Address>>,
}

impl LeagueSnapshot {
    pub fn new(league: League, entries: Option<Vec<Entry>>, winners: Option<Vec<Address>>) -> Self {
        Self {
            league,
            entries,
            winners,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn derive(&self, now_seconds: u64, viewer: Option<&Address>) -> LeagueView {
        derive(
            &self.league,
            self.entries.as_deref(),
            self.winners.as_deref(),
            now_seconds,
            viewer,
        )
    }

    pub fn check_consistency(&self) -> Result<(), CoreError> {
        check_consistency(&self.league, self.entries.as_deref(), self.winners.as_deref())
    }

    pub fn entry_for(&self, player: &Address) -> Option<&Entry> {
        self.entries
            .as_deref()
            .and_then(|entries| find_entry(entries, player))
    }
}

/// Phase-aware view of a league for one viewer at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeagueView {
    pub league_id: u64,
    pub phase: LeagueStatus,
    pub player_count: usize,
    pub is_full: bool,
    pub is_creator: bool,
    pub is_player: bool,
    pub is_winner: bool,
    pub has_ended: bool,
    /// The viewer's own `claimed` flag, when the viewer has an entry
    pub viewer_claimed: Option<bool>,
    pub allowed_actions: BTreeSet<LeagueAction>,
    /// `None` when the full pot does not fit in `u128`
    pub estimated_pot: Option<u128>,
    pub estimated_house_cut: Option<u128>,
    /// Set when the snapshot broke an invariant; no actions are offered then
    pub inconsistency: Option<String>,
}

impl LeagueView {
    pub fn allows(&self, action: LeagueAction) -> bool {
        self.allowed_actions.contains(&action)
    }

    pub fn is_consistent(&self) -> bool {
        self.inconsistency.is_none()
    }
}

fn find_entry<'a>(entries: &'a [Entry], player: &Address) -> Option<&'a Entry> {
    entries.iter().find(|entry| entry.player == *player)
}

/// Derive the viewer's view of a league.
///
/// Missing `entries` or `winners` are treated as empty. An inconsistent
/// snapshot yields no actions and records the reason in
/// [`LeagueView::inconsistency`] instead of failing.
pub fn derive(
    league: &League,
    entries: Option<&[Entry]>,
    winners: Option<&[Address]>,
    now_seconds: u64,
    viewer: Option<&Address>,
) -> LeagueView {
    let entry_list = entries.unwrap_or_default();
    let winner_list = winners.unwrap_or_default();

    let phase = league.status;
    let player_count = entry_list.len();
    let is_full = player_count >= league.max_players as usize;

    let viewer_entry = viewer.and_then(|viewer| find_entry(entry_list, viewer));
    let is_creator = viewer.is_some_and(|viewer| *viewer == league.creator);
    let is_player = viewer_entry.is_some();
    let is_winner = viewer.is_some_and(|viewer| winner_list.contains(viewer));
    let viewer_claimed = viewer_entry.map(|entry| entry.claimed);
    let unclaimed = viewer_claimed == Some(false);

    let has_ended =
        phase == LeagueStatus::Active && league.end_time > 0 && now_seconds >= league.end_time;

    let inconsistency = check_consistency(league, entries, winners)
        .err()
        .map(|err| err.to_string());

    let mut allowed_actions = BTreeSet::new();
    if inconsistency.is_none() {
        if phase == LeagueStatus::Created && is_creator && player_count >= MIN_PLAYERS_TO_START {
            allowed_actions.insert(LeagueAction::StartEarly);
        }
        if phase == LeagueStatus::Created && !is_full && !is_player && viewer.is_some() {
            allowed_actions.insert(LeagueAction::Join);
        }
        if has_ended {
            allowed_actions.insert(LeagueAction::Settle);
        }
        if phase == LeagueStatus::Settled && is_winner && unclaimed {
            allowed_actions.insert(LeagueAction::Claim);
        }
        if phase == LeagueStatus::Cancelled && is_player && unclaimed {
            allowed_actions.insert(LeagueAction::Refund);
        }
    }

    let pot = estimated_pot(league.entry_fee, league.max_players);

    LeagueView {
        league_id: league.id,
        phase,
        player_count,
        is_full,
        is_creator,
        is_player,
        is_winner,
        has_ended,
        viewer_claimed,
        allowed_actions,
        estimated_pot: pot,
        estimated_house_cut: pot.map(|pot| house_cut(pot, league.house_cut_bps)),
        inconsistency,
    }
}

/// Check the invariants the escrow contract guarantees for every snapshot.
///
/// Relations involving `entries` or `winners` are only checked once those
/// reads have loaded.
pub fn check_consistency(
    league: &League,
    entries: Option<&[Entry]>,
    winners: Option<&[Address]>,
) -> Result<(), CoreError> {
    let inconsistent = |msg: String| Err(CoreError::InconsistentSnapshot(msg));

    if league.house_cut_bps > MAX_HOUSE_CUT_BPS {
        return inconsistent(format!(
            "league {} has a house cut of {} bps",
            league.id, league.house_cut_bps
        ));
    }

    // a league cancelled before activation keeps a zero end time
    let activated = matches!(league.status, LeagueStatus::Active | LeagueStatus::Settled);
    let created = league.status == LeagueStatus::Created;
    if (created && league.end_time != 0) || (activated && league.end_time == 0) {
        return inconsistent(format!(
            "league {} is {} with end time {}",
            league.id, league.status, league.end_time
        ));
    }

    if let Some(entries) = entries {
        if entries.len() > league.max_players as usize {
            return inconsistent(format!(
                "league {} has {} entries for {} slots",
                league.id,
                entries.len(),
                league.max_players
            ));
        }
    }

    if let Some(winners) = winners {
        match league.status {
            LeagueStatus::Settled if winners.is_empty() => {
                return inconsistent(format!("league {} is settled without winners", league.id));
            }
            LeagueStatus::Settled => {}
            status if !winners.is_empty() => {
                return inconsistent(format!("league {} has winners while {}", league.id, status));
            }
            _ => {}
        }

        if let Some(entries) = entries {
            if let Some(outsider) = winners.iter().find(|w| find_entry(entries, w).is_none()) {
                return inconsistent(format!(
                    "league {} winner {} never entered",
                    league.id, outsider
                ));
            }
        }
    }

    Ok(())
}
