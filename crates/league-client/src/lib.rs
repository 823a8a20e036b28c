pub mod config;
pub mod domain;
pub mod infra;

pub use config::*;
pub use domain::{
    ActionError, Countdown, LeagueClient, LeagueWatcher, PendingFlags, PendingGuard, PendingKind,
};
pub use infra::clock::{Clock, ManualClock, SystemClock};
pub use infra::escrow::{Error as EscrowError, Escrow};
#[cfg(any(feature = "e2e-testing", debug_assertions))]
pub use infra::escrow_mock::{MockEscrow, MockWallet};
