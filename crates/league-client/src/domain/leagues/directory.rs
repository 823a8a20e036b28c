use futures::future::join_all;
use league_core::{LeagueSummary, StatusFilter};
use log::{debug, warn};

use super::LeagueClient;
use crate::infra::escrow::Error as EscrowError;

impl LeagueClient {
    /// League cards for the directory tab, oldest league first.
    ///
    /// Leagues whose reads fail are left out rather than failing the listing.
    pub async fn list_leagues(
        &self,
        filter: StatusFilter,
    ) -> Result<Vec<LeagueSummary>, EscrowError> {
        let count = self.escrow().read_league_count().await?;
        debug!("listing {} leagues with filter {}", count, filter.label());

        let reads = (0..count).map(|league_id| async move {
            let (league, entries) = tokio::join!(
                self.escrow().read_league(league_id),
                self.escrow().read_entries(league_id),
            );
            (league_id, league, entries)
        });

        let now = self.now_seconds();
        let summaries = join_all(reads)
            .await
            .into_iter()
            .filter_map(|(league_id, league, entries)| {
                let league = match league {
                    Ok(league) => league,
                    Err(e) => {
                        warn!("skipping league {}: {}", league_id, e);
                        return None;
                    }
                };
                if !filter.matches(league.status) {
                    return None;
                }
                let player_count = match entries {
                    Ok(entries) => entries.len(),
                    Err(e) => {
                        warn!("failed to read entries for league {}: {}", league_id, e);
                        0
                    }
                };
                Some(LeagueSummary::new(
                    &league,
                    player_count,
                    now,
                    self.decimals(),
                    &self.gate().token_symbol,
                ))
            })
            .collect();

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use league_core::{Address, CreateLeagueForm, LeagueStatus};

    use crate::{
        infra::{clock::ManualClock, escrow_mock::MockEscrow},
        ChainSettings,
    };

    use super::*;

    const ONE_TOKEN: u128 = 1_000_000_000_000_000_000;

    #[tokio::test]
    async fn test_directory_filters_by_status() {
        let settings = ChainSettings::default();
        let clock = ManualClock::new(1_000);
        let escrow = MockEscrow::new(settings.escrow(), settings.token(), Arc::new(clock.clone()));
        let creator = Address::new(format!("0x{}", "c".repeat(40)));
        let client = LeagueClient::new(
            Arc::new(escrow.wallet(creator.clone())),
            Arc::new(clock),
            &settings,
            Some(creator),
        );
        client.set_connected_chain(Some(settings.chain_id)).await;

        let mut form = CreateLeagueForm::default();
        form.picks_mut().set(0, format!("0x{}", "9".repeat(40)));
        for _ in 0..3 {
            client.approve(100 * ONE_TOKEN).await.unwrap();
            client.create_league(&form).await.unwrap();
        }
        escrow.cancel_league(1).unwrap();

        let all = client.list_leagues(StatusFilter::All).await.unwrap();
        let ids: Vec<u64> = all.iter().map(|s| s.league_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(all[0].players, "1/4");
        assert_eq!(all[0].pot, "100 CLAWD");

        let cancelled = client
            .list_leagues(StatusFilter::Only(LeagueStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].league_id, 1);

        let active = client
            .list_leagues(StatusFilter::Only(LeagueStatus::Active))
            .await
            .unwrap();
        assert!(active.is_empty());
    }
}
