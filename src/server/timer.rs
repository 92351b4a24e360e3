use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

pub trait Timer {
    fn timestamp(&self) -> u64;
}

/// Wall clock with second granularity, anchored to the UNIX epoch at
/// process start and advanced by a background tick task.
pub struct SystemTimer {
    start_epoch: u64,
    seconds: AtomicU64,
    cancellation_token: CancellationToken,
}

impl SystemTimer {
    pub fn new(cancellation_token: CancellationToken) -> Self {
        let start_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);
        debug!("Creating system timer, start epoch: {}", start_epoch);
        SystemTimer {
            start_epoch,
            seconds: AtomicU64::new(0),
            cancellation_token,
        }
    }

    pub async fn run(&self) {
        let start = Instant::now() + Duration::from_secs(1);
        let mut interval = interval_at(start, Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = self.cancellation_token.cancelled() => {
                    debug!("System timer received cancellation signal, stopping...");
                    break;
                },
                _ = interval.tick() => {
                    self.add_second();
                    trace!("Server tick: {}", self.timestamp());
                },
            }
        }
    }

    fn add_second(&self) {
        self.seconds.fetch_add(1, Ordering::Release);
    }
}

impl Timer for SystemTimer {
    fn timestamp(&self) -> u64 {
        self.start_epoch + self.seconds.load(Ordering::Acquire)
    }
}
