use std::sync::Arc;

use crate::app::auth::JwtKeys;
use crate::app::config::Config;
use crate::services::{AtomicMetrics, CommissionService, PayoutBatcher, PayoutService};
use crate::store::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub commissions: Arc<CommissionService>,
    pub batcher: Arc<PayoutBatcher>,
    pub payouts: Arc<PayoutService>,
    pub metrics: Arc<AtomicMetrics>,
    pub keys: Arc<JwtKeys>,
}

impl AppState {
    /// Wires every service to the same store so payouts and ledger rows share
    /// one lock.
    pub fn new(config: &Config, store: Arc<MemoryStore>) -> Self {
        let metrics = Arc::new(AtomicMetrics::new());

        let commissions = Arc::new(CommissionService::new(
            store.clone(),
            store.clone(),
            config.default_commission_rate_bps,
            metrics.clone(),
        ));
        let batcher = Arc::new(PayoutBatcher::new(
            store.clone(),
            store.clone(),
            config.min_payout_cents,
            metrics.clone(),
        ));
        let payouts = Arc::new(PayoutService::new(store.clone(), store));

        Self {
            commissions,
            batcher,
            payouts,
            metrics,
            keys: Arc::new(JwtKeys::from_secret(&config.jwt_secret)),
        }
    }
}
