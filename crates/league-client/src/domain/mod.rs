mod leagues;

pub use leagues::*;

use league_core::{CoreError, GateStep, LeagueAction};
use thiserror::Error;

use crate::infra::escrow::Error as EscrowError;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("{0}")]
    Validation(#[from] CoreError),
    #[error("{0}")]
    External(#[from] EscrowError),
    #[error("{0} is already pending")]
    AlreadyPending(PendingKind),
    #[error("{action} is not available for league {league_id}")]
    NotAllowed {
        league_id: u64,
        action: LeagueAction,
    },
    #[error("transaction gate is waiting on: {0}")]
    GateBlocked(GateStep),
    #[error("no wallet connected")]
    NoWallet,
}

impl ActionError {
    /// Errors raised before anything was sent to the escrow contract.
    pub fn is_local(&self) -> bool {
        !matches!(self, ActionError::External(_))
    }
}
