use std::sync::Arc;

use league_core::{
    expected_total_pot, Address, CreateLeagueForm, GateControl, GateObservation, GatePending,
    GateState, JoinLeagueForm, LeagueAction, LeagueSnapshot, LeagueView, TransactionGate,
};
use log::{debug, error, info, warn};
use tokio::sync::RwLock;

use super::{PendingFlags, PendingKind};
use crate::{
    domain::ActionError,
    infra::{
        clock::Clock,
        escrow::{Error as EscrowError, Escrow},
    },
    ChainSettings,
};

/// Reads league snapshots through an [`Escrow`] and runs gated writes against it.
///
/// Writes are sent from the account the escrow handle is bound to, which is
/// also the viewer every [`LeagueView`] is derived for.
pub struct LeagueClient {
    escrow: Arc<dyn Escrow>,
    clock: Arc<dyn Clock>,
    gate: TransactionGate,
    token: Address,
    decimals: u8,
    account: Option<Address>,
    connected_chain_id: RwLock<Option<u64>>,
    pending: PendingFlags,
}

impl LeagueClient {
    pub fn new(
        escrow: Arc<dyn Escrow>,
        clock: Arc<dyn Clock>,
        settings: &ChainSettings,
        account: Option<Address>,
    ) -> Self {
        Self {
            escrow,
            clock,
            gate: settings.transaction_gate(),
            token: settings.token(),
            decimals: settings.token_decimals,
            account,
            connected_chain_id: RwLock::new(None),
            pending: PendingFlags::default(),
        }
    }

    pub fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    pub fn escrow(&self) -> &dyn Escrow {
        self.escrow.as_ref()
    }

    pub fn gate(&self) -> &TransactionGate {
        &self.gate
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn now_seconds(&self) -> u64 {
        self.clock.now_seconds()
    }

    pub fn pending(&self) -> &PendingFlags {
        &self.pending
    }

    /// Record the chain the wallet reports, `None` once it disconnects.
    pub async fn set_connected_chain(&self, chain_id: Option<u64>) {
        let mut connected = self.connected_chain_id.write().await;
        if *connected != chain_id {
            debug!("wallet chain changed from {:?} to {:?}", *connected, chain_id);
            *connected = chain_id;
        }
    }

    pub async fn connected_chain(&self) -> Option<u64> {
        *self.connected_chain_id.read().await
    }

    /// Read the league together with its entries and winners.
    ///
    /// Only the league read is required; entries or winners that fail to load
    /// are left as `None` so the view can still be derived.
    pub async fn snapshot(&self, league_id: u64) -> Result<LeagueSnapshot, EscrowError> {
        let (league, entries, winners) = tokio::join!(
            self.escrow.read_league(league_id),
            self.escrow.read_entries(league_id),
            self.escrow.read_winners(league_id),
        );
        let league = league?;

        let entries = entries
            .map_err(|e| warn!("failed to read entries for league {}: {}", league_id, e))
            .ok();
        let winners = winners
            .map_err(|e| warn!("failed to read winners for league {}: {}", league_id, e))
            .ok();

        if let Some(entries) = &entries {
            match expected_total_pot(league.entry_fee, entries.len()) {
                Some(expected) if expected == league.total_pot => {}
                Some(expected) => warn!(
                    "league {} pot is {} but {} entries at {} make {}",
                    league_id,
                    league.total_pot,
                    entries.len(),
                    league.entry_fee,
                    expected
                ),
                None => warn!(
                    "league {} pot of {} entries at {} overflows",
                    league_id,
                    entries.len(),
                    league.entry_fee
                ),
            }
        }

        Ok(LeagueSnapshot::new(league, entries, winners))
    }

    /// Fresh snapshot derived for the connected account at the current time.
    pub async fn view(&self, league_id: u64) -> Result<LeagueView, ActionError> {
        let snapshot = self.snapshot(league_id).await?;
        let view = snapshot.derive(self.clock.now_seconds(), self.account.as_ref());
        if let Some(reason) = &view.inconsistency {
            warn!("league {} offers no actions: {}", league_id, reason);
        }
        Ok(view)
    }

    /// Token allowance granted to the escrow, `None` while unknown.
    pub async fn allowance(&self) -> Option<u128> {
        let owner = self.account.as_ref()?;
        match self
            .escrow
            .read_allowance(owner, &self.gate.spender, &self.token)
            .await
        {
            Ok(allowance) => Some(allowance),
            Err(e) => {
                warn!("failed to read allowance for {}: {}", owner, e);
                None
            }
        }
    }

    /// Gate observation for a write that spends `amount` (zero for none).
    pub async fn observe(&self, amount: u128, execute_label: &str, disabled: bool) -> GateObservation {
        let allowance = if amount > 0 { self.allowance().await } else { None };
        GateObservation {
            connected_chain_id: self.connected_chain().await,
            allowance,
            amount,
            execute_label: execute_label.to_string(),
            disabled,
        }
    }

    pub async fn gate_state(&self, amount: u128, execute_label: &str, disabled: bool) -> GateState {
        self.gate
            .evaluate(&self.observe(amount, execute_label, disabled).await)
    }

    /// The control to render for `observation` while writes may be in flight.
    pub fn gate_control(&self, observation: &GateObservation, execute: PendingKind) -> GateControl {
        self.gate
            .control(observation, self.pending.gate_pending(execute))
    }

    pub fn gate_pending(&self, execute: PendingKind) -> GatePending {
        self.pending.gate_pending(execute)
    }

    /// Approve the escrow to spend exactly `amount` of the staking token.
    pub async fn approve(&self, amount: u128) -> Result<(), ActionError> {
        // create and join spend the allowance this sets
        let _guard = self
            .pending
            .acquire_excluding(
                PendingKind::Approve,
                &[
                    PendingKind::CreateLeague,
                    PendingKind::Action(LeagueAction::Join),
                ],
            )
            .map_err(ActionError::AlreadyPending)?;
        self.require_account()?;

        // approval only needs the right network, the allowance may be unknown
        if let state @ GateState::NetworkMismatch { .. } = self.gate_state(0, "Approve", false).await {
            return Err(ActionError::GateBlocked(state.step()));
        }

        self.escrow
            .write_approve(&self.gate.spender, amount)
            .await
            .map_err(|e| {
                error!("approve {} for {} failed: {}", amount, self.gate.spender, e);
                ActionError::External(e)
            })?;
        info!("approved {} for {}", amount, self.gate.spender);
        Ok(())
    }

    /// Create a league from the form; the creator enters with the form's picks.
    pub async fn create_league(&self, form: &CreateLeagueForm) -> Result<LeagueView, ActionError> {
        let _guard = self
            .pending
            .acquire_excluding(PendingKind::CreateLeague, &[PendingKind::Approve])
            .map_err(ActionError::AlreadyPending)?;
        self.require_account()?;

        let request = form.validate(self.decimals)?;
        self.require_ready(request.entry_fee, "Create League").await?;

        let league_id = self
            .escrow
            .write_create_league(request)
            .await
            .map_err(|e| {
                error!("create league failed: {}", e);
                ActionError::External(e)
            })?;
        info!("created league {}", league_id);
        self.view(league_id).await
    }

    pub async fn join(&self, form: &JoinLeagueForm) -> Result<LeagueView, ActionError> {
        let kind = PendingKind::Action(LeagueAction::Join);
        let _guard = self
            .pending
            .acquire_excluding(kind, &[PendingKind::Approve])
            .map_err(ActionError::AlreadyPending)?;
        self.require_account()?;
        let request = form.validate()?;

        let league_id = form.league_id;
        let view = self.view(league_id).await?;
        if !view.allows(LeagueAction::Join) {
            return Err(ActionError::NotAllowed {
                league_id,
                action: LeagueAction::Join,
            });
        }
        self.require_ready(form.entry_fee, LeagueAction::Join.label())
            .await?;

        self.escrow
            .write_join_league(league_id, request.picks)
            .await
            .map_err(|e| {
                error!("join league {} failed: {}", league_id, e);
                ActionError::External(e)
            })?;
        info!("joined league {}", league_id);
        self.view(league_id).await
    }

    pub async fn start_early(&self, league_id: u64) -> Result<LeagueView, ActionError> {
        self.run_action(league_id, LeagueAction::StartEarly).await
    }

    pub async fn settle(&self, league_id: u64) -> Result<LeagueView, ActionError> {
        self.run_action(league_id, LeagueAction::Settle).await
    }

    pub async fn claim(&self, league_id: u64) -> Result<LeagueView, ActionError> {
        self.run_action(league_id, LeagueAction::Claim).await
    }

    pub async fn refund(&self, league_id: u64) -> Result<LeagueView, ActionError> {
        self.run_action(league_id, LeagueAction::Refund).await
    }

    /// Writes that move no tokens: only the network step of the gate applies.
    async fn run_action(
        &self,
        league_id: u64,
        action: LeagueAction,
    ) -> Result<LeagueView, ActionError> {
        let kind = PendingKind::Action(action);
        let _guard = self
            .pending
            .acquire(kind)
            .ok_or(ActionError::AlreadyPending(kind))?;
        self.require_account()?;

        let view = self.view(league_id).await?;
        if !view.allows(action) {
            return Err(ActionError::NotAllowed { league_id, action });
        }
        self.require_ready(0, action.label()).await?;

        let result = match action {
            LeagueAction::StartEarly => self.escrow.write_start_league(league_id).await,
            LeagueAction::Settle => self.escrow.write_settle_league(league_id).await,
            LeagueAction::Claim => self.escrow.write_claim_winnings(league_id).await,
            LeagueAction::Refund => self.escrow.write_claim_refund(league_id).await,
            LeagueAction::Join => {
                return Err(ActionError::NotAllowed { league_id, action });
            }
        };
        result.map_err(|e| {
            error!("{} for league {} failed: {}", action, league_id, e);
            ActionError::External(e)
        })?;

        info!("{} sent for league {}", action, league_id);
        self.view(league_id).await
    }

    fn require_account(&self) -> Result<&Address, ActionError> {
        self.account.as_ref().ok_or(ActionError::NoWallet)
    }

    async fn require_ready(&self, amount: u128, label: &str) -> Result<(), ActionError> {
        let state = self.gate_state(amount, label, false).await;
        match state {
            GateState::ReadyToExecute { .. } => Ok(()),
            blocked => Err(ActionError::GateBlocked(blocked.step())),
        }
    }
}
