use crate::cache::cache::Cache;
use log::debug;
use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

/// Periodically drops expired records so that idle keys do not linger
/// until the next client access.
pub struct ExpirySweeper {
    store: Arc<dyn Cache + Send + Sync>,
    cancellation_token: CancellationToken,
}

impl ExpirySweeper {
    const INTERVAL_IN_MILLIS: u64 = 1000;

    pub fn new(store: Arc<dyn Cache + Send + Sync>, cancellation_token: CancellationToken) -> Self {
        debug!("Creating expiry sweeper");
        ExpirySweeper {
            store,
            cancellation_token,
        }
    }

    pub async fn run(&self) {
        let start = Instant::now();
        let mut interval = interval_at(
            start,
            Duration::from_millis(ExpirySweeper::INTERVAL_IN_MILLIS),
        );
        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    info!("Expiry sweeper received cancellation signal, stopping...");
                    break;
                },
                _ = interval.tick() => {
                    let start = StdInstant::now();
                    self.store.evict_expired();
                    let duration = start.elapsed();
                    if duration.as_millis() > (ExpirySweeper::INTERVAL_IN_MILLIS * 2) as u128 {
                        warn!("Expiry sweep finished in: {:?}", duration);
                    } else {
                        trace!("Expiry sweep finished in: {:?}", duration);
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::dash_map_store::DashMapMemoryStore;
    use crate::server::timer::SystemTimer;

    #[tokio::test]
    async fn run_stops_on_cancellation() {
        let token = CancellationToken::new();
        let timer = Arc::new(SystemTimer::new(token.clone()));
        let store: Arc<dyn Cache + Send + Sync> = Arc::new(DashMapMemoryStore::new(timer));
        let sweeper = ExpirySweeper::new(store, token.clone());
        token.cancel();
        sweeper.run().await;
    }
}
