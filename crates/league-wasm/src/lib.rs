//! league-wasm: browser bindings for league-core
//!
//! Every export takes plain JS objects and returns plain JS objects. Token
//! amounts cross the boundary as `BigInt`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::prelude::*;

// Re-export league-core types
pub use league_core::*;

#[derive(Error, Debug)]
pub enum BindingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to build output: {0}")]
    Output(String),
    #[error("{0}")]
    Core(#[from] CoreError),
}

impl From<BindingError> for JsValue {
    fn from(error: BindingError) -> Self {
        JsValue::from_str(&error.to_string())
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("league-wasm initialized");
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, BindingError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| BindingError::InvalidInput(e.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, BindingError> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_large_number_types_as_bigints(true);
    value
        .serialize(&serializer)
        .map_err(|e| BindingError::Output(e.to_string()))
}

#[derive(Debug, Deserialize)]
pub struct DeriveRequest {
    pub snapshot: LeagueSnapshot,
    pub now_seconds: u64,
    #[serde(default)]
    pub viewer: Option<Address>,
}

impl DeriveRequest {
    pub fn run(&self) -> LeagueView {
        self.snapshot.derive(self.now_seconds, self.viewer.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub struct GateRequest {
    pub gate: TransactionGate,
    pub observation: GateObservation,
    #[serde(default)]
    pub pending: GatePending,
}

impl GateRequest {
    pub fn state(&self) -> GateState {
        self.gate.evaluate(&self.observation)
    }

    pub fn control(&self) -> GateControl {
        self.gate.control(&self.observation, self.pending)
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryRequest {
    pub league: League,
    pub player_count: usize,
    pub now_seconds: u64,
    pub decimals: u8,
    pub token_symbol: String,
}

impl SummaryRequest {
    pub fn run(&self) -> LeagueSummary {
        LeagueSummary::new(
            &self.league,
            self.player_count,
            self.now_seconds,
            self.decimals,
            &self.token_symbol,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct PlayerRowsRequest {
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub winners: Option<Vec<Address>>,
}

impl PlayerRowsRequest {
    pub fn run(&self) -> Vec<PlayerRow> {
        PlayerRow::from_entries(&self.entries, self.winners.as_deref())
    }
}

/// Derive the viewer's league view from `{ snapshot, now_seconds, viewer }`.
#[wasm_bindgen(js_name = "deriveLeagueView")]
pub fn derive_league_view(request: JsValue) -> Result<JsValue, JsValue> {
    let request: DeriveRequest = from_js(request)?;
    let view = request.run();
    if let Some(reason) = &view.inconsistency {
        log::warn!("league {} offers no actions: {}", view.league_id, reason);
    }
    Ok(to_js(&view)?)
}

/// Evaluate the gate from `{ gate, observation }`.
#[wasm_bindgen(js_name = "evaluateGate")]
pub fn evaluate_gate(request: JsValue) -> Result<JsValue, JsValue> {
    let request: GateRequest = from_js(request)?;
    Ok(to_js(&request.state())?)
}

/// The single control to render from `{ gate, observation, pending }`.
#[wasm_bindgen(js_name = "gateControl")]
pub fn gate_control(request: JsValue) -> Result<JsValue, JsValue> {
    let request: GateRequest = from_js(request)?;
    Ok(to_js(&request.control())?)
}

#[wasm_bindgen(js_name = "formatCountdown")]
pub fn format_countdown_wasm(end_time: u64, now_seconds: u64) -> String {
    format_countdown(end_time, now_seconds)
}

#[wasm_bindgen(js_name = "isValidPickAddress")]
pub fn is_valid_pick_address_wasm(address: &str) -> bool {
    is_valid_pick_address(address)
}

/// Valid picks among the raw input strings, in input order.
#[wasm_bindgen(js_name = "collectValidPicks")]
pub fn collect_valid_picks_wasm(raw: JsValue, max_picks: u32) -> Result<JsValue, JsValue> {
    let raw: Vec<String> = from_js(raw)?;
    Ok(to_js(&collect_valid_picks(&raw, max_picks))?)
}

#[wasm_bindgen(js_name = "canSubmitPicks")]
pub fn can_submit_picks(raw: JsValue, max_picks: u32) -> Result<bool, JsValue> {
    let raw: Vec<String> = from_js(raw)?;
    Ok(can_submit(&collect_valid_picks(&raw, max_picks), max_picks))
}

#[wasm_bindgen(js_name = "leagueSummary")]
pub fn league_summary(request: JsValue) -> Result<JsValue, JsValue> {
    let request: SummaryRequest = from_js(request)?;
    Ok(to_js(&request.run())?)
}

#[wasm_bindgen(js_name = "playerRows")]
pub fn player_rows(request: JsValue) -> Result<JsValue, JsValue> {
    let request: PlayerRowsRequest = from_js(request)?;
    Ok(to_js(&request.run())?)
}

/// Base units as a decimal string, for amounts typed by the user.
#[wasm_bindgen(js_name = "parseTokenAmount")]
pub fn parse_token_amount_wasm(amount: &str, decimals: u8) -> Result<String, JsValue> {
    parse_token_amount(amount, decimals)
        .map(|units| units.to_string())
        .map_err(|e| BindingError::from(e).into())
}

#[wasm_bindgen(js_name = "formatTokenAmount")]
pub fn format_token_amount_wasm(units: &str, decimals: u8) -> Result<String, JsValue> {
    let units: u128 = units
        .parse()
        .map_err(|_| BindingError::InvalidInput(format!("not a base unit amount: {units}")))?;
    Ok(format_token_amount(units, decimals))
}
