use std::{sync::Arc, time::Duration};

use league_core::{format_countdown, LeagueView, TimeRemaining};
use log::{debug, error, info, warn};
use tokio::{sync::watch, time::sleep};
use tokio_util::sync::CancellationToken;

use super::LeagueClient;
use crate::infra::clock::Clock;

/// Re-derives one league's view on an interval and publishes it.
pub struct LeagueWatcher {
    client: Arc<LeagueClient>,
    league_id: u64,
    refresh_interval: Duration,
    cancel_token: CancellationToken,
    sender: watch::Sender<Option<LeagueView>>,
}

impl LeagueWatcher {
    pub fn new(
        client: Arc<LeagueClient>,
        league_id: u64,
        cancel_token: CancellationToken,
        refresh_interval: Duration,
    ) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            client,
            league_id,
            refresh_interval,
            cancel_token,
            sender,
        }
    }

    /// Latest view, `None` until the first successful read.
    pub fn subscribe(&self) -> watch::Receiver<Option<LeagueView>> {
        self.sender.subscribe()
    }

    pub async fn watch(&self) -> Result<(), anyhow::Error> {
        info!("Starting league {} watcher", self.league_id);

        loop {
            if self.cancel_token.is_cancelled() {
                info!("League {} watcher received cancellation", self.league_id);
                break;
            }

            match self.client.view(self.league_id).await {
                Ok(view) => self.publish(view),
                Err(e) => error!("League {} refresh error: {}", self.league_id, e),
            }

            tokio::select! {
                _ = sleep(self.refresh_interval) => continue,
                _ = self.cancel_token.cancelled() => {
                    info!("League {} watcher cancelled during sleep", self.league_id);
                    break;
                }
            }
        }

        Ok(())
    }

    fn publish(&self, view: LeagueView) {
        // a lagging read can return an older status; keep the newer one
        let regressed = self.sender.borrow().as_ref().is_some_and(|previous| {
            !previous.phase.can_advance_to(view.phase)
        });
        if regressed {
            warn!(
                "League {} read went back to {}, keeping the newer view",
                self.league_id, view.phase
            );
            return;
        }
        self.sender.send_replace(Some(view));
    }
}

/// Publishes the countdown to `end_time` every tick until it reads "Ended".
pub struct Countdown {
    clock: Arc<dyn Clock>,
    end_time: u64,
    tick: Duration,
    cancel_token: CancellationToken,
    sender: watch::Sender<String>,
}

impl Countdown {
    pub fn new(
        clock: Arc<dyn Clock>,
        end_time: u64,
        tick: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        let (sender, _) = watch::channel(format_countdown(end_time, clock.now_seconds()));
        Self {
            clock,
            end_time,
            tick,
            cancel_token,
            sender,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }

    pub async fn run(&self) {
        loop {
            let now = self.clock.now_seconds();
            self.sender
                .send_replace(format_countdown(self.end_time, now));
            if TimeRemaining::until(self.end_time, now).has_ended() {
                debug!("countdown to {} ended", self.end_time);
                break;
            }

            tokio::select! {
                _ = sleep(self.tick) => continue,
                _ = self.cancel_token.cancelled() => break,
            }
        }
    }
}
