//! Render-ready summaries for the league directory, league cards and player lists

use serde::{Deserialize, Serialize};

use crate::{format_countdown, format_token_amount, Address, Entry, League, LeagueStatus};

/// `0x1234...abcd`; strings too short to shorten are returned unchanged.
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Directory tab selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", content = "status", rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Only(LeagueStatus),
}

impl StatusFilter {
    /// Tabs in display order: All, then one per status.
    pub fn tabs() -> Vec<StatusFilter> {
        std::iter::once(StatusFilter::All)
            .chain(LeagueStatus::ALL.into_iter().map(StatusFilter::Only))
            .collect()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Only(status) => status.label(),
        }
    }

    pub fn matches(&self, status: LeagueStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRow {
    pub player: String,
    pub is_winner: bool,
    pub claimed: bool,
    pub picks: Vec<String>,
}

impl PlayerRow {
    pub fn from_entries(entries: &[Entry], winners: Option<&[Address]>) -> Vec<PlayerRow> {
        let winners = winners.unwrap_or_default();
        entries
            .iter()
            .map(|entry| PlayerRow {
                player: truncate_address(entry.player.as_str()),
                is_winner: winners.contains(&entry.player),
                claimed: entry.claimed,
                picks: entry
                    .picks
                    .iter()
                    .map(|pick| truncate_address(pick.as_str()))
                    .collect(),
            })
            .collect()
    }
}

/// Everything a league card shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeagueSummary {
    pub league_id: u64,
    pub status: LeagueStatus,
    pub status_label: &'static str,
    pub entry_fee: String,
    pub players: String,
    pub duration: String,
    pub pot: String,
    /// Only present while the league is running
    pub ends_in: Option<String>,
}

impl LeagueSummary {
    pub fn new(
        league: &League,
        player_count: usize,
        now_seconds: u64,
        decimals: u8,
        token_symbol: &str,
    ) -> Self {
        let ends_in = (league.status == LeagueStatus::Active && league.end_time > 0)
            .then(|| format_countdown(league.end_time, now_seconds));

        Self {
            league_id: league.id,
            status: league.status,
            status_label: league.status.label(),
            entry_fee: format!(
                "{} {}",
                format_token_amount(league.entry_fee, decimals),
                token_symbol
            ),
            players: format!("{}/{}", player_count, league.max_players),
            duration: format!("{}d", league.duration as f64 / 86_400.0),
            pot: format!(
                "{} {}",
                format_token_amount(league.total_pot, decimals),
                token_symbol
            ),
            ends_in,
        }
    }
}
