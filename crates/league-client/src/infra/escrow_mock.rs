use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use async_trait::async_trait;
use league_core::{Address, CreateLeagueRequest, Entry, League, LeagueStatus, MAX_HOUSE_CUT_BPS};
use log::debug;

use super::{
    clock::Clock,
    escrow::{Error, Escrow},
};

struct MockLeague {
    league: League,
    entries: Vec<Entry>,
    winners: Vec<Address>,
}

#[derive(Default)]
struct MockChain {
    leagues: Vec<MockLeague>,
    /// (owner, spender) -> allowance for the staking token
    allowances: HashMap<(Address, Address), u128>,
    pending_outcomes: HashMap<u64, Vec<Address>>,
    fail_next_write: Option<Error>,
    write_count: usize,
}

/// In-memory stand-in for the league escrow contract.
///
/// Enforces the contract rules the client relies on: forward-only status,
/// capacity, allowance consumption and claim-once. Settlement uses winners
/// queued with [`MockEscrow::queue_winners`]; a league settled without a
/// queued outcome is cancelled.
#[derive(Clone)]
pub struct MockEscrow {
    escrow_address: Address,
    token_address: Address,
    clock: Arc<dyn Clock>,
    chain: Arc<RwLock<MockChain>>,
}

impl MockEscrow {
    pub fn new(escrow_address: Address, token_address: Address, clock: Arc<dyn Clock>) -> Self {
        Self {
            escrow_address,
            token_address,
            clock,
            chain: Arc::new(RwLock::new(MockChain::default())),
        }
    }

    /// A handle that sends writes from `account`.
    pub fn wallet(&self, account: Address) -> MockWallet {
        MockWallet {
            escrow: self.clone(),
            account,
        }
    }

    pub fn queue_winners(&self, league_id: u64, winners: Vec<Address>) {
        self.write().pending_outcomes.insert(league_id, winners);
    }

    /// Cancel a league that has not settled, as the contract does for
    /// leagues that never gather enough players.
    pub fn cancel_league(&self, league_id: u64) -> Result<(), Error> {
        let mut chain = self.write();
        let league = &mut chain.league_mut(league_id)?.league;
        if league.status.is_terminal() {
            return Err(Error::Reverted(format!(
                "league {} is already {}",
                league_id, league.status
            )));
        }
        league.status = LeagueStatus::Cancelled;
        Ok(())
    }

    /// Make the next write fail with `error` without touching any state.
    pub fn fail_next_write(&self, error: Error) {
        self.write().fail_next_write = Some(error);
    }

    /// Writes that reached the contract, failed ones included.
    pub fn write_count(&self) -> usize {
        self.read().write_count
    }

    fn read(&self) -> RwLockReadGuard<'_, MockChain> {
        self.chain.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MockChain> {
        self.chain.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the write and surface an injected failure.
    fn begin_write(&self) -> Result<RwLockWriteGuard<'_, MockChain>, Error> {
        let mut chain = self.write();
        chain.write_count += 1;
        match chain.fail_next_write.take() {
            Some(error) => Err(error),
            None => Ok(chain),
        }
    }
}

impl MockChain {
    fn league(&self, league_id: u64) -> Result<&MockLeague, Error> {
        self.leagues
            .get(league_id as usize)
            .ok_or_else(|| Error::NotFound(format!("League {} not found", league_id)))
    }

    fn league_mut(&mut self, league_id: u64) -> Result<&mut MockLeague, Error> {
        self.leagues
            .get_mut(league_id as usize)
            .ok_or_else(|| Error::NotFound(format!("League {} not found", league_id)))
    }

    fn spend_allowance(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), Error> {
        let allowance = self
            .allowances
            .entry((owner.clone(), spender.clone()))
            .or_default();
        if *allowance < amount {
            return Err(Error::Reverted(String::from("ERC20: insufficient allowance")));
        }
        *allowance -= amount;
        Ok(())
    }
}

fn check_picks(picks: &[Address], max_picks: u32) -> Result<(), Error> {
    if picks.is_empty() || picks.len() > max_picks as usize {
        return Err(Error::Reverted(format!(
            "expected 1 to {} picks, got {}",
            max_picks,
            picks.len()
        )));
    }
    Ok(())
}

fn activate(league: &mut League, now: u64) {
    league.status = LeagueStatus::Active;
    league.end_time = now + league.duration;
}

pub struct MockWallet {
    escrow: MockEscrow,
    account: Address,
}

#[async_trait]
impl Escrow for MockWallet {
    async fn read_league(&self, league_id: u64) -> Result<League, Error> {
        Ok(self.escrow.read().league(league_id)?.league.clone())
    }

    async fn read_entries(&self, league_id: u64) -> Result<Vec<Entry>, Error> {
        Ok(self.escrow.read().league(league_id)?.entries.clone())
    }

    async fn read_winners(&self, league_id: u64) -> Result<Vec<Address>, Error> {
        Ok(self.escrow.read().league(league_id)?.winners.clone())
    }

    async fn read_allowance(
        &self,
        owner: &Address,
        spender: &Address,
        token: &Address,
    ) -> Result<u128, Error> {
        if token != &self.escrow.token_address {
            return Err(Error::NotFound(format!("Token {} not found", token)));
        }
        Ok(self
            .escrow
            .read()
            .allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0))
    }

    async fn read_league_count(&self) -> Result<u64, Error> {
        Ok(self.escrow.read().leagues.len() as u64)
    }

    async fn write_create_league(&self, request: CreateLeagueRequest) -> Result<u64, Error> {
        let mut chain = self.escrow.begin_write()?;

        if request.entry_fee == 0 || request.duration == 0 {
            return Err(Error::Reverted(String::from("invalid fee or duration")));
        }
        if request.max_players < 2 || request.max_picks < 1 {
            return Err(Error::Reverted(String::from("invalid league size")));
        }
        if request.house_cut_bps > MAX_HOUSE_CUT_BPS {
            return Err(Error::Reverted(String::from("house cut too high")));
        }
        check_picks(&request.picks, request.max_picks)?;
        chain.spend_allowance(&self.account, &self.escrow.escrow_address, request.entry_fee)?;

        let id = chain.leagues.len() as u64;
        chain.leagues.push(MockLeague {
            league: League {
                id,
                creator: self.account.clone(),
                entry_fee: request.entry_fee,
                duration: request.duration,
                max_players: request.max_players,
                max_picks: request.max_picks,
                house_cut_bps: request.house_cut_bps,
                end_time: 0,
                total_pot: request.entry_fee,
                status: LeagueStatus::Created,
            },
            entries: vec![Entry {
                player: self.account.clone(),
                picks: request.picks,
                claimed: false,
            }],
            winners: vec![],
        });
        debug!("mock escrow: league {} created by {}", id, self.account);
        Ok(id)
    }

    async fn write_join_league(&self, league_id: u64, picks: Vec<Address>) -> Result<(), Error> {
        let mut chain = self.escrow.begin_write()?;
        let now = self.escrow.clock.now_seconds();

        let (entry_fee, max_picks) = {
            let mock = chain.league(league_id)?;
            if mock.league.status != LeagueStatus::Created {
                return Err(Error::Reverted(format!("league {} is not open", league_id)));
            }
            if mock.entries.iter().any(|e| e.player == self.account) {
                return Err(Error::Reverted(String::from("already joined")));
            }
            if mock.entries.len() >= mock.league.max_players as usize {
                return Err(Error::Reverted(String::from("league is full")));
            }
            (mock.league.entry_fee, mock.league.max_picks)
        };
        check_picks(&picks, max_picks)?;
        chain.spend_allowance(&self.account, &self.escrow.escrow_address, entry_fee)?;

        let mock = chain.league_mut(league_id)?;
        mock.entries.push(Entry {
            player: self.account.clone(),
            picks,
            claimed: false,
        });
        mock.league.total_pot += entry_fee;
        if mock.entries.len() >= mock.league.max_players as usize {
            activate(&mut mock.league, now);
            debug!("mock escrow: league {} filled and activated", league_id);
        }
        Ok(())
    }

    async fn write_start_league(&self, league_id: u64) -> Result<(), Error> {
        let mut chain = self.escrow.begin_write()?;
        let now = self.escrow.clock.now_seconds();
        let mock = chain.league_mut(league_id)?;

        if mock.league.status != LeagueStatus::Created {
            return Err(Error::Reverted(format!("league {} already started", league_id)));
        }
        if mock.league.creator != self.account {
            return Err(Error::Reverted(String::from("only the creator can start")));
        }
        if mock.entries.len() < 2 {
            return Err(Error::Reverted(String::from("need at least 2 players")));
        }
        activate(&mut mock.league, now);
        Ok(())
    }

    async fn write_settle_league(&self, league_id: u64) -> Result<(), Error> {
        let mut chain = self.escrow.begin_write()?;
        let now = self.escrow.clock.now_seconds();
        {
            let league = &chain.league(league_id)?.league;
            if league.status != LeagueStatus::Active {
                return Err(Error::Reverted(format!("league {} is not active", league_id)));
            }
            if now < league.end_time {
                return Err(Error::Reverted(format!("league {} has not ended", league_id)));
            }
        }

        // a reverted settle leaves the queued outcome in place
        let winners = chain
            .pending_outcomes
            .get(&league_id)
            .cloned()
            .unwrap_or_default();
        let mock = chain.league_mut(league_id)?;
        if let Some(outsider) = winners
            .iter()
            .find(|w| !mock.entries.iter().any(|e| &e.player == *w))
        {
            return Err(Error::Reverted(format!("{} is not a player", outsider)));
        }
        if winners.is_empty() {
            mock.league.status = LeagueStatus::Cancelled;
        } else {
            mock.league.status = LeagueStatus::Settled;
            mock.winners = winners;
        }
        chain.pending_outcomes.remove(&league_id);
        Ok(())
    }

    async fn write_claim_winnings(&self, league_id: u64) -> Result<(), Error> {
        let mut chain = self.escrow.begin_write()?;
        let mock = chain.league_mut(league_id)?;

        if mock.league.status != LeagueStatus::Settled || !mock.winners.contains(&self.account) {
            return Err(Error::Reverted(String::from("nothing to claim")));
        }
        let entry = mock
            .entries
            .iter_mut()
            .find(|e| e.player == self.account)
            .ok_or_else(|| Error::Reverted(String::from("not a player")))?;
        if entry.claimed {
            return Err(Error::Reverted(String::from("already claimed")));
        }
        entry.claimed = true;
        Ok(())
    }

    async fn write_claim_refund(&self, league_id: u64) -> Result<(), Error> {
        let mut chain = self.escrow.begin_write()?;
        let mock = chain.league_mut(league_id)?;

        if mock.league.status != LeagueStatus::Cancelled {
            return Err(Error::Reverted(format!("league {} is not cancelled", league_id)));
        }
        let entry = mock
            .entries
            .iter_mut()
            .find(|e| e.player == self.account)
            .ok_or_else(|| Error::Reverted(String::from("not a player")))?;
        if entry.claimed {
            return Err(Error::Reverted(String::from("already refunded")));
        }
        entry.claimed = true;
        Ok(())
    }

    async fn write_approve(&self, spender: &Address, amount: u128) -> Result<(), Error> {
        let mut chain = self.escrow.begin_write()?;
        chain
            .allowances
            .insert((self.account.clone(), spender.clone()), amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::clock::ManualClock;
    use tokio_test::{assert_err, assert_ok};

    const FEE: u128 = 100;

    fn addr(digit: char) -> Address {
        Address::new(format!("0x{}", digit.to_string().repeat(40)))
    }

    fn setup() -> (MockEscrow, ManualClock) {
        let clock = ManualClock::new(1_000);
        let escrow = MockEscrow::new(addr('e'), addr('t'), Arc::new(clock.clone()));
        (escrow, clock)
    }

    fn request() -> CreateLeagueRequest {
        CreateLeagueRequest {
            entry_fee: FEE,
            duration: 500,
            max_players: 3,
            max_picks: 1,
            house_cut_bps: 500,
            picks: vec![addr('9')],
        }
    }

    async fn funded(escrow: &MockEscrow, digit: char) -> MockWallet {
        let wallet = escrow.wallet(addr(digit));
        wallet.write_approve(&addr('e'), FEE).await.unwrap();
        wallet
    }

    #[tokio::test]
    async fn test_create_requires_allowance() {
        let (escrow, _) = setup();
        let creator = escrow.wallet(addr('c'));
        assert!(matches!(
            creator.write_create_league(request()).await,
            Err(Error::Reverted(_))
        ));

        let creator = funded(&escrow, 'c').await;
        let id = creator.write_create_league(request()).await.unwrap();
        assert_eq!(id, 0);

        let league = creator.read_league(id).await.unwrap();
        assert_eq!(league.status, LeagueStatus::Created);
        assert_eq!(league.total_pot, FEE);
        assert_eq!(creator.read_entries(id).await.unwrap().len(), 1);
        assert_eq!(
            creator
                .read_allowance(&addr('c'), &addr('e'), &addr('t'))
                .await
                .unwrap(),
            0
        );
        assert_eq!(creator.read_league_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_last_slot_activates_league() {
        let (escrow, clock) = setup();
        let creator = funded(&escrow, 'c').await;
        let id = creator.write_create_league(request()).await.unwrap();

        funded(&escrow, '1').await.write_join_league(id, vec![addr('8')]).await.unwrap();
        clock.advance(10);
        funded(&escrow, '2').await.write_join_league(id, vec![addr('8')]).await.unwrap();

        let league = creator.read_league(id).await.unwrap();
        assert_eq!(league.status, LeagueStatus::Active);
        assert_eq!(league.end_time, 1_010 + 500);
        assert_eq!(league.total_pot, 3 * FEE);

        let late = funded(&escrow, '3').await;
        assert!(late.write_join_league(id, vec![addr('8')]).await.is_err());
    }

    #[tokio::test]
    async fn test_settle_and_claim_once() {
        let (escrow, clock) = setup();
        let creator = funded(&escrow, 'c').await;
        let id = creator.write_create_league(request()).await.unwrap();
        let player = funded(&escrow, '1').await;
        player.write_join_league(id, vec![addr('8')]).await.unwrap();
        creator.write_start_league(id).await.unwrap();

        assert!(player.write_settle_league(id).await.is_err());
        clock.advance(500);
        escrow.queue_winners(id, vec![addr('1')]);
        player.write_settle_league(id).await.unwrap();
        assert_eq!(player.read_winners(id).await.unwrap(), vec![addr('1')]);

        assert!(creator.write_claim_winnings(id).await.is_err());
        player.write_claim_winnings(id).await.unwrap();
        assert!(player.write_claim_winnings(id).await.is_err());
    }

    #[tokio::test]
    async fn test_settle_without_outcome_cancels() {
        let (escrow, clock) = setup();
        let creator = funded(&escrow, 'c').await;
        let id = creator.write_create_league(request()).await.unwrap();
        funded(&escrow, '1').await.write_join_league(id, vec![addr('8')]).await.unwrap();
        creator.write_start_league(id).await.unwrap();
        clock.advance(600);

        assert_ok!(creator.write_settle_league(id).await);
        assert_eq!(
            creator.read_league(id).await.unwrap().status,
            LeagueStatus::Cancelled
        );
        assert_ok!(creator.write_claim_refund(id).await);
        assert_err!(creator.write_claim_refund(id).await);
    }

    #[tokio::test]
    async fn test_reverted_settle_keeps_queued_outcome() {
        let (escrow, clock) = setup();
        let creator = funded(&escrow, 'c').await;
        let id = creator.write_create_league(request()).await.unwrap();
        funded(&escrow, '1').await.write_join_league(id, vec![addr('8')]).await.unwrap();
        creator.write_start_league(id).await.unwrap();
        clock.advance(600);

        escrow.queue_winners(id, vec![addr('1'), addr('7')]);
        assert_err!(creator.write_settle_league(id).await);
        // still queued, so a retry reverts again instead of cancelling
        assert_err!(creator.write_settle_league(id).await);
        assert_eq!(
            creator.read_league(id).await.unwrap().status,
            LeagueStatus::Active
        );

        escrow.queue_winners(id, vec![addr('1')]);
        assert_ok!(creator.write_settle_league(id).await);
        assert_eq!(
            creator.read_league(id).await.unwrap().status,
            LeagueStatus::Settled
        );
        assert_eq!(creator.read_winners(id).await.unwrap(), vec![addr('1')]);
    }

    #[tokio::test]
    async fn test_injected_failure_leaves_state_untouched() {
        let (escrow, _) = setup();
        let creator = escrow.wallet(addr('c'));
        escrow.fail_next_write(Error::Rejected("user denied".into()));

        assert_eq!(
            creator.write_approve(&addr('e'), FEE).await,
            Err(Error::Rejected("user denied".into()))
        );
        assert_eq!(
            creator
                .read_allowance(&addr('c'), &addr('e'), &addr('t'))
                .await
                .unwrap(),
            0
        );
        creator.write_approve(&addr('e'), FEE).await.unwrap();
        assert_eq!(escrow.write_count(), 2);
    }
}
