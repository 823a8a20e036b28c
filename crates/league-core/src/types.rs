//! Shared types between the league client and the browser bindings

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Compare two hex account identifiers the way every identity check in this crate does.
pub fn same_address(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Hex account identifier as returned by the wallet or the escrow contract.
///
/// Equality and hashing ignore ASCII case, so `0xAbC...` and `0xabc...` are the
/// same account. The original string is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used for identity comparisons and map keys.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn matches(&self, other: &str) -> bool {
        same_address(&self.0, other)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        same_address(&self.0, &other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// League status as stored by the escrow contract, ordinal encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LeagueStatus {
    Created = 0,
    Active = 1,
    Settled = 2,
    Cancelled = 3,
}

impl LeagueStatus {
    pub const ALL: [LeagueStatus; 4] = [
        LeagueStatus::Created,
        LeagueStatus::Active,
        LeagueStatus::Settled,
        LeagueStatus::Cancelled,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Active => "Active",
            Self::Settled => "Settled",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Settled and Cancelled leagues never change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Cancelled)
    }

    /// Whether a later observation of the same league may report `next`.
    ///
    /// Created may jump straight to a terminal status when the Active
    /// observation was missed between two reads.
    pub fn can_advance_to(&self, next: LeagueStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            Self::Created => true,
            Self::Active => next.is_terminal(),
            Self::Settled | Self::Cancelled => false,
        }
    }
}

impl fmt::Display for LeagueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl TryFrom<u8> for LeagueStatus {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Created),
            1 => Ok(Self::Active),
            2 => Ok(Self::Settled),
            3 => Ok(Self::Cancelled),
            other => Err(CoreError::UnknownStatus(other)),
        }
    }
}

impl From<LeagueStatus> for u8 {
    fn from(value: LeagueStatus) -> Self {
        value as u8
    }
}

/// One league as read from the escrow contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: u64,
    pub creator: Address,
    /// Stake per participant, in token base units
    pub entry_fee: u128,
    /// Seconds the league runs once activated
    pub duration: u64,
    pub max_players: u32,
    pub max_picks: u32,
    /// Fee taken from the pot at settlement, 0..=1000
    pub house_cut_bps: u16,
    /// Unix seconds; zero until the league is activated
    pub end_time: u64,
    pub total_pot: u128,
    pub status: LeagueStatus,
}

/// One participant's stake record within a league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub player: Address,
    pub picks: Vec<Address>,
    pub claimed: bool,
}

/// Actions a viewer may be offered for a league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeagueAction {
    StartEarly,
    Join,
    Settle,
    Claim,
    Refund,
}

impl LeagueAction {
    pub fn label(&self) -> &'static str {
        match self {
            Self::StartEarly => "Start League",
            Self::Join => "Join League",
            Self::Settle => "Settle League",
            Self::Claim => "Claim Winnings",
            Self::Refund => "Claim Refund",
        }
    }
}

impl fmt::Display for LeagueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
