//! Create and join form state.
//!
//! Both forms stake the entry fee, so both hand the gate the same
//! observation shape: amount = entry fee, disabled until the input validates.

use serde::{Deserialize, Serialize};

use crate::{
    collect_valid_picks, estimated_pot, house_cut, parse_token_amount, percent_to_bps,
    validate_picks, Address, CoreError, GateObservation, League, LeagueAction,
};

pub const MIN_LEAGUE_PLAYERS: u32 = 2;
pub const MAX_LEAGUE_PLAYERS: u32 = 10;
pub const MAX_PICKS_PER_ENTRY: u32 = 3;
pub const MAX_HOUSE_CUT_PERCENT: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPreset {
    OneDay,
    SevenDays,
}

impl DurationPreset {
    pub fn seconds(&self) -> u64 {
        match self {
            Self::OneDay => 86_400,
            Self::SevenDays => 604_800,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneDay => "1 Day",
            Self::SevenDays => "7 Days",
        }
    }
}

/// Arguments for `createLeague`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLeagueRequest {
    pub entry_fee: u128,
    pub duration: u64,
    pub max_players: u32,
    pub max_picks: u32,
    pub house_cut_bps: u16,
    pub picks: Vec<Address>,
}

/// Arguments for `joinLeague`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinLeagueRequest {
    pub league_id: u64,
    pub picks: Vec<Address>,
}

/// Free-text pick inputs, at least one and at most `max` slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickSlots {
    slots: Vec<String>,
    max: u32,
}

impl PickSlots {
    pub fn new(max: u32) -> Self {
        Self {
            slots: vec![String::new()],
            max: max.max(1),
        }
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn can_add(&self) -> bool {
        self.slots.len() < self.max as usize
    }

    pub fn add(&mut self) -> bool {
        if !self.can_add() {
            return false;
        }
        self.slots.push(String::new());
        true
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    /// Lowering the maximum drops the trailing slots.
    pub fn set_max(&mut self, max: u32) {
        self.max = max.max(1);
        self.slots.truncate(self.max as usize);
    }

    pub fn valid(&self) -> Vec<Address> {
        collect_valid_picks(&self.slots, self.max)
    }

    pub fn validate(&self) -> Result<Vec<Address>, CoreError> {
        validate_picks(&self.slots, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLeagueForm {
    /// Entry fee as typed, in whole tokens
    pub entry_fee: String,
    pub duration: DurationPreset,
    max_players: u32,
    house_cut_percent: u8,
    picks: PickSlots,
}

impl Default for CreateLeagueForm {
    fn default() -> Self {
        Self {
            entry_fee: String::from("100"),
            duration: DurationPreset::OneDay,
            max_players: 4,
            house_cut_percent: 5,
            picks: PickSlots::new(1),
        }
    }
}

impl CreateLeagueForm {
    pub fn max_players(&self) -> u32 {
        self.max_players
    }

    pub fn set_max_players(&mut self, max_players: u32) {
        self.max_players = max_players.clamp(MIN_LEAGUE_PLAYERS, MAX_LEAGUE_PLAYERS);
    }

    pub fn max_picks(&self) -> u32 {
        self.picks.max()
    }

    pub fn set_max_picks(&mut self, max_picks: u32) {
        self.picks.set_max(max_picks.clamp(1, MAX_PICKS_PER_ENTRY));
    }

    pub fn house_cut_percent(&self) -> u8 {
        self.house_cut_percent
    }

    pub fn set_house_cut_percent(&mut self, percent: u8) {
        self.house_cut_percent = percent.min(MAX_HOUSE_CUT_PERCENT);
    }

    pub fn picks(&self) -> &PickSlots {
        &self.picks
    }

    pub fn picks_mut(&mut self) -> &mut PickSlots {
        &mut self.picks
    }

    /// Entry fee in base units; an empty field counts as zero.
    pub fn entry_fee_units(&self, decimals: u8) -> Result<u128, CoreError> {
        if self.entry_fee.trim().is_empty() {
            return Ok(0);
        }
        parse_token_amount(&self.entry_fee, decimals)
    }

    pub fn house_cut_bps(&self) -> u16 {
        u16::from(self.house_cut_percent) * 100
    }

    /// Pot if every slot fills; zero while the fee does not parse, `None`
    /// when the pot does not fit in `u128`.
    pub fn estimated_pot(&self, decimals: u8) -> Option<u128> {
        estimated_pot(self.entry_fee_units(decimals).unwrap_or(0), self.max_players)
    }

    pub fn estimated_house_cut(&self, decimals: u8) -> Option<u128> {
        self.estimated_pot(decimals)
            .map(|pot| house_cut(pot, self.house_cut_bps()))
    }

    pub fn validate(&self, decimals: u8) -> Result<CreateLeagueRequest, CoreError> {
        let entry_fee = self.entry_fee_units(decimals)?;
        if entry_fee == 0 {
            return Err(CoreError::ZeroEntryFee);
        }
        if estimated_pot(entry_fee, self.max_players).is_none() {
            return Err(CoreError::InvalidAmount(format!(
                "{} players at {} overflow the pot",
                self.max_players, self.entry_fee
            )));
        }
        let picks = self.picks.validate()?;
        let house_cut_bps = percent_to_bps(f64::from(self.house_cut_percent))?;

        Ok(CreateLeagueRequest {
            entry_fee,
            duration: self.duration.seconds(),
            max_players: self.max_players,
            max_picks: self.picks.max(),
            house_cut_bps,
            picks,
        })
    }

    pub fn can_create(&self, decimals: u8) -> bool {
        self.validate(decimals).is_ok()
    }

    pub fn gate_observation(
        &self,
        decimals: u8,
        connected_chain_id: Option<u64>,
        allowance: Option<u128>,
    ) -> GateObservation {
        GateObservation {
            connected_chain_id,
            allowance,
            amount: self.entry_fee_units(decimals).unwrap_or(0),
            execute_label: String::from("Create League"),
            disabled: !self.can_create(decimals),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinLeagueForm {
    pub league_id: u64,
    pub entry_fee: u128,
    picks: PickSlots,
}

impl JoinLeagueForm {
    pub fn new(league: &League) -> Self {
        Self {
            league_id: league.id,
            entry_fee: league.entry_fee,
            picks: PickSlots::new(league.max_picks),
        }
    }

    pub fn picks(&self) -> &PickSlots {
        &self.picks
    }

    pub fn picks_mut(&mut self) -> &mut PickSlots {
        &mut self.picks
    }

    pub fn validate(&self) -> Result<JoinLeagueRequest, CoreError> {
        Ok(JoinLeagueRequest {
            league_id: self.league_id,
            picks: self.picks.validate()?,
        })
    }

    pub fn gate_observation(
        &self,
        connected_chain_id: Option<u64>,
        allowance: Option<u128>,
    ) -> GateObservation {
        GateObservation {
            connected_chain_id,
            allowance,
            amount: self.entry_fee,
            execute_label: LeagueAction::Join.label().to_string(),
            disabled: self.validate().is_err(),
        }
    }
}
