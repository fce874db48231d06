/*
[INPUT]:  HTTP client, session and refresh interval
[OUTPUT]: Latest swap price published on a watch channel
[POS]:    Service layer - periodic price refresh
[UPDATE]: When refresh cadence or cancellation behavior changes
*/

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::CarbonHubClient;
use crate::types::{Session, SwapPrice};

/// Polls `GET /swap/price` on an interval.
///
/// Fire-and-forget: failed polls are logged and skipped, and a poll still in
/// flight when the token is cancelled is dropped.
#[derive(Debug, Clone)]
pub struct PriceTicker {
    client: CarbonHubClient,
    session: Session,
    interval: Duration,
}

pub struct PriceSubscription {
    pub receiver: watch::Receiver<Option<SwapPrice>>,
    pub handle: JoinHandle<()>,
}

impl PriceTicker {
    pub fn new(client: CarbonHubClient, session: Session, interval: Duration) -> Self {
        Self {
            client,
            session,
            interval: interval.max(Duration::from_millis(100)),
        }
    }

    pub fn spawn(self, shutdown: CancellationToken) -> PriceSubscription {
        let (tx, receiver) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("discarding in-flight price request");
                        break;
                    }
                    result = self.client.swap_price(&self.session) => match result {
                        Ok(price) => {
                            tx.send_replace(Some(price));
                        }
                        Err(err) => warn!(error = %err, "price refresh failed"),
                    }
                }
            }
            info!("price ticker stopped");
        });

        PriceSubscription { receiver, handle }
    }
}
