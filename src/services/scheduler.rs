use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::services::PayoutBatcher;

/// Runs `schedule_auto_payouts` every `every`, starting one interval from now.
pub fn spawn(batcher: Arc<PayoutBatcher>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Auto payout scheduler running every {:?}", every);

        let mut ticker = time::interval_at(time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(err) = batcher.schedule_auto_payouts().await {
                error!(error = %err, "scheduled payout run failed");
            }
        }
    })
}
