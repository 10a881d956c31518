//! Live mode: re-fetches point rates on a fixed interval.

use crate::core::currency::{CurrencyRate, MarketStatus};
use crate::core::service::CurrencyService;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub const DEFAULT_LIVE_INTERVAL: Duration = Duration::from_secs(30);
/// Shorter intervals are raised to this.
pub const MIN_LIVE_INTERVAL: Duration = Duration::from_secs(1);
const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone)]
pub struct LiveUpdate {
    pub tick: u64,
    pub rates: Vec<CurrencyRate>,
    pub market_status: MarketStatus,
}

pub struct LiveFeed {
    service: Arc<CurrencyService>,
    pairs: Vec<(String, String)>,
    interval: Duration,
    sender: mpsc::Sender<LiveUpdate>,
    handle: Option<JoinHandle<()>>,
}

impl LiveFeed {
    pub fn new(
        service: Arc<CurrencyService>,
        pairs: Vec<(String, String)>,
        interval: Duration,
    ) -> (Self, mpsc::Receiver<LiveUpdate>) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        if interval < MIN_LIVE_INTERVAL {
            warn!("Live interval {:?} too short, using {:?}", interval, MIN_LIVE_INTERVAL);
        }
        let feed = LiveFeed {
            service,
            pairs,
            interval: interval.max(MIN_LIVE_INTERVAL),
            sender,
            handle: None,
        };
        (feed, receiver)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Starts polling. Returns false, and does nothing, if already running.
    ///
    /// The first update is produced immediately, then one per interval.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            debug!("Live feed already running");
            return false;
        }

        let service = Arc::clone(&self.service);
        let pairs = self.pairs.clone();
        let sender = self.sender.clone();
        let period = self.interval;
        info!("Starting live feed for {} pairs every {:?}", pairs.len(), period);

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut tick = 0;
            loop {
                ticker.tick().await;
                tick += 1;
                let rates = poll_rates(&service, &pairs).await;
                let update = LiveUpdate {
                    tick,
                    rates,
                    market_status: service.get_market_status(),
                };
                if sender.send(update).await.is_err() {
                    debug!("Live feed receiver dropped, stopping");
                    break;
                }
            }
        }));
        true
    }

    /// Stops polling. A fetch in flight is abandoned with the task.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                info!("Stopped live feed");
                true
            }
            None => false,
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_rates(service: &CurrencyService, pairs: &[(String, String)]) -> Vec<CurrencyRate> {
    let futures = pairs
        .iter()
        .map(|(from, to)| async move { (from, to, service.refresh_exchange_rate(from, to).await) });
    join_all(futures)
        .await
        .into_iter()
        .filter_map(|(from, to, result)| match result {
            Ok(rate) => Some(rate),
            Err(e) => {
                warn!("Live refresh failed for {from}/{to}: {e}");
                None
            }
        })
        .collect()
}
