use league_core::{Address, CreateLeagueRequest, Entry, League};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("item not found: {0}")]
    NotFound(String),
    /// The wallet declined to sign
    #[error("request rejected by wallet: {0}")]
    Rejected(String),
    #[error("transaction reverted: {0}")]
    Reverted(String),
    #[error("escrow temporarily unavailable: {0}")]
    Transient(String),
}

/// Read and write access to the league escrow contract.
///
/// Write calls are sent from the account the implementation is bound to.
/// Repeating a write whose effect already landed must be rejected or be a
/// no-op on the contract side; callers never retry on their own.
#[async_trait::async_trait]
pub trait Escrow: Send + Sync {
    /// Latest committed snapshot; may be stale but never internally inconsistent.
    async fn read_league(&self, league_id: u64) -> Result<League, Error>;
    async fn read_entries(&self, league_id: u64) -> Result<Vec<Entry>, Error>;
    /// Empty until the league settles.
    async fn read_winners(&self, league_id: u64) -> Result<Vec<Address>, Error>;
    async fn read_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        token: &Address,
    ) -> Result<u128, Error>;
    /// League ids are `0..count`.
    async fn read_league_count(&self) -> Result<u64, Error>;

    async fn write_create_league(&self, request: CreateLeagueRequest) -> Result<u64, Error>;
    async fn write_join_league(&self, league_id: u64, picks: Vec<Address>) -> Result<(), Error>;
    async fn write_start_league(&self, league_id: u64) -> Result<(), Error>;
    async fn write_settle_league(&self, league_id: u64) -> Result<(), Error>;
    async fn write_claim_winnings(&self, league_id: u64) -> Result<(), Error>;
    async fn write_claim_refund(&self, league_id: u64) -> Result<(), Error>;
    async fn write_approve(&self, spender: &Address, amount: u128) -> Result<(), Error>;
}
