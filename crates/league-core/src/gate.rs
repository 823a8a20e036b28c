//! Switch network -> approve token -> execute.
//!
//! Every token-spending action goes through the same three steps. The gate is
//! re-evaluated from fresh observations on every render or poll and keeps no
//! memory of earlier approvals: an approval only counts once the re-read
//! allowance covers the amount.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Address;

/// Chain the escrow contract is deployed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub chain_id: u64,
    pub name: String,
}

/// What the gate needs to know about the current moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateObservation {
    /// Chain the wallet is connected to, `None` when unknown
    pub connected_chain_id: Option<u64>,
    /// Allowance for the spender, `None` while it is still loading
    pub allowance: Option<u128>,
    /// Tokens the execute action will move
    pub amount: u128,
    pub execute_label: String,
    /// Caller-side gate on the execute action, e.g. invalid form input
    #[serde(default)]
    pub disabled: bool,
}

/// The one step the user must take next. Variants are listed in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    NetworkMismatch { required_network: String },
    ApprovalRequired { spender: Address, amount: u128 },
    ReadyToExecute { label: String, disabled: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStep {
    SwitchNetwork,
    Approve,
    Execute,
}

impl fmt::Display for GateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwitchNetwork => write!(f, "switch_network"),
            Self::Approve => write!(f, "approve"),
            Self::Execute => write!(f, "execute"),
        }
    }
}

/// Writes currently in flight for one gate instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatePending {
    pub approve: bool,
    pub execute: bool,
}

impl GatePending {
    pub fn any(&self) -> bool {
        self.approve || self.execute
    }

    pub fn is_pending(&self, step: GateStep) -> bool {
        match step {
            GateStep::SwitchNetwork => false,
            GateStep::Approve => self.approve,
            GateStep::Execute => self.execute,
        }
    }
}

/// The single control a front-end renders for the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateControl {
    pub step: GateStep,
    pub label: String,
    pub enabled: bool,
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionGate {
    pub required_network: Network,
    /// Contract that will pull the tokens
    pub spender: Address,
    pub token_symbol: String,
}

impl TransactionGate {
    pub fn new(required_network: Network, spender: Address, token_symbol: impl Into<String>) -> Self {
        Self {
            required_network,
            spender,
            token_symbol: token_symbol.into(),
        }
    }

    /// First matching state wins: network, then allowance, then execute.
    pub fn evaluate(&self, observation: &GateObservation) -> GateState {
        if observation.connected_chain_id != Some(self.required_network.chain_id) {
            return GateState::NetworkMismatch {
                required_network: self.required_network.name.clone(),
            };
        }

        if let Some(allowance) = observation.allowance {
            if allowance < observation.amount {
                return GateState::ApprovalRequired {
                    spender: self.spender.clone(),
                    amount: observation.amount,
                };
            }
        }

        GateState::ReadyToExecute {
            label: observation.execute_label.clone(),
            disabled: observation.disabled,
        }
    }

    /// Evaluate and turn the result into the control to render.
    pub fn control(&self, observation: &GateObservation, pending: GatePending) -> GateControl {
        let state = self.evaluate(observation);
        state.control(&self.token_symbol, observation.disabled, pending)
    }
}

impl GateState {
    pub fn step(&self) -> GateStep {
        match self {
            Self::NetworkMismatch { .. } => GateStep::SwitchNetwork,
            Self::ApprovalRequired { .. } => GateStep::Approve,
            Self::ReadyToExecute { .. } => GateStep::Execute,
        }
    }

    /// Network switching happens in the wallet, so that control is never enabled.
    /// The other two are disabled while any gate write is in flight or the
    /// caller has disabled submission.
    pub fn control(&self, token_symbol: &str, disabled: bool, pending: GatePending) -> GateControl {
        let step = self.step();
        let label = match self {
            Self::NetworkMismatch { required_network } => {
                format!("Switch Network to {required_network}")
            }
            Self::ApprovalRequired { .. } => format!("Approve {token_symbol}"),
            Self::ReadyToExecute { label, .. } => label.clone(),
        };
        let enabled = match self {
            Self::NetworkMismatch { .. } => false,
            Self::ApprovalRequired { .. } | Self::ReadyToExecute { .. } => {
                !pending.any() && !disabled
            }
        };

        GateControl {
            step,
            label,
            enabled,
            pending: pending.is_pending(step),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const AMOUNT: u128 = 100;

    fn gate() -> TransactionGate {
        TransactionGate::new(
            Network {
                chain_id: 8453,
                name: "Base".into(),
            },
            Address::new(format!("0x{}", "e".repeat(40))),
            "CLAWD",
        )
    }

    fn observe(chain: Option<u64>, allowance: Option<u128>) -> GateObservation {
        GateObservation {
            connected_chain_id: chain,
            allowance,
            amount: AMOUNT,
            execute_label: "Join League".into(),
            disabled: false,
        }
    }

    #[test]
    fn test_network_mismatch_wins_over_approval() {
        let state = gate().evaluate(&observe(Some(1), Some(0)));
        assert_eq!(
            state,
            GateState::NetworkMismatch {
                required_network: "Base".into()
            }
        );

        let control = gate().control(&observe(Some(1), Some(0)), GatePending::default());
        assert_eq!(control.step, GateStep::SwitchNetwork);
        assert_eq!(control.label, "Switch Network to Base");
        assert!(!control.enabled);
    }

    #[test]
    fn test_unknown_network_is_a_mismatch() {
        let state = gate().evaluate(&observe(None, Some(AMOUNT)));
        assert_eq!(state.step(), GateStep::SwitchNetwork);
    }

    #[test]
    fn test_low_allowance_requires_exact_approval() {
        let state = gate().evaluate(&observe(Some(8453), Some(AMOUNT - 1)));
        assert_eq!(
            state,
            GateState::ApprovalRequired {
                spender: gate().spender,
                amount: AMOUNT
            }
        );
        let control = state.control("CLAWD", false, GatePending::default());
        assert_eq!(control.label, "Approve CLAWD");
        assert!(control.enabled);
    }

    #[test]
    fn test_loading_allowance_does_not_block_execute() {
        let state = gate().evaluate(&observe(Some(8453), None));
        assert_eq!(state.step(), GateStep::Execute);
    }

    #[test]
    fn test_approval_is_observed_not_remembered() {
        let gate = gate();
        let before = gate.evaluate(&observe(Some(8453), Some(0)));
        assert_eq!(before.step(), GateStep::Approve);

        // the approval write landed and the allowance was re-read
        let after = gate.evaluate(&observe(Some(8453), Some(AMOUNT)));
        assert_eq!(
            after,
            GateState::ReadyToExecute {
                label: "Join League".into(),
                disabled: false
            }
        );

        // evaluating again with the old allowance goes straight back
        assert_eq!(gate.evaluate(&observe(Some(8453), Some(0))), before);
    }

    #[test]
    fn test_disabled_flag_gates_execute() {
        let mut observation = observe(Some(8453), Some(AMOUNT));
        observation.disabled = true;
        let control = gate().control(&observation, GatePending::default());
        assert_eq!(control.step, GateStep::Execute);
        assert!(!control.enabled);
    }

    #[test]
    fn test_pending_write_disables_every_step() {
        let gate = gate();
        let approving = GatePending {
            approve: true,
            execute: false,
        };
        let control = gate.control(&observe(Some(8453), Some(0)), approving);
        assert!(control.pending);
        assert!(!control.enabled);

        // allowance landed but the approve flag has not been cleared yet
        let control = gate.control(&observe(Some(8453), Some(AMOUNT)), approving);
        assert_eq!(control.step, GateStep::Execute);
        assert!(!control.pending);
        assert!(!control.enabled);

        let executing = GatePending {
            approve: false,
            execute: true,
        };
        let control = gate.control(&observe(Some(8453), Some(AMOUNT)), executing);
        assert!(control.pending);
        assert!(!control.enabled);

        let control = gate.control(&observe(Some(8453), Some(AMOUNT)), GatePending::default());
        assert!(control.enabled);
    }
}
