pub mod memory;
pub mod seed;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::app::error::AppResult;
use crate::models::booking::{Booking, Provider};
use crate::models::commission::{CommissionRecord, LedgerPayoutStatus};
use crate::models::payout::{Payout, PayoutFilter, PayoutUpdate};
use crate::utils::period::Period;

pub use memory::MemoryStore;

/// Read access to the booking side of the marketplace.
#[async_trait]
pub trait BookingDirectory: Send + Sync {
    async fn booking(&self, booking_id: &str) -> AppResult<Option<Booking>>;
    async fn provider(&self, provider_id: &str) -> AppResult<Option<Provider>>;
}

#[derive(Debug, Clone, Default)]
pub struct LedgerFilter {
    pub provider_id: Option<String>,
    pub payout_status: Option<LedgerPayoutStatus>,
    pub period: Period,
}

impl LedgerFilter {
    pub fn matches(&self, record: &CommissionRecord) -> bool {
        self.provider_id
            .as_deref()
            .map_or(true, |id| record.provider_id == id)
            && self
                .payout_status
                .map_or(true, |status| record.payout_status == status)
            && self.period.contains(record.processed_at)
    }
}

/// Parameters for turning a provider's pending earnings into a payout.
#[derive(Debug, Clone)]
pub struct PayoutPlan {
    pub minimum_cents: u64,
    pub payout_method: String,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub payout: Payout,
    pub record_ids: Vec<String>,
}

#[async_trait]
pub trait CommissionLedger: Send + Sync {
    async fn find_by_booking(&self, booking_id: &str) -> AppResult<Option<CommissionRecord>>;

    /// Stores `record` unless the booking already has one. Returns the stored
    /// record and whether it was created by this call.
    async fn insert_if_absent(&self, record: CommissionRecord)
        -> AppResult<(CommissionRecord, bool)>;

    /// Matching records, newest `processed_at` first.
    async fn records(&self, filter: &LedgerFilter) -> AppResult<Vec<CommissionRecord>>;

    async fn pending_total(&self, provider_id: &str) -> AppResult<u64>;

    /// `(provider_id, pending earnings)` for every provider with pending records,
    /// ordered by provider id.
    async fn pending_by_provider(&self) -> AppResult<Vec<(String, u64)>>;

    /// All-or-nothing: sums the provider's pending earnings, fails with
    /// `InsufficientPayoutAmount` below `plan.minimum_cents`, otherwise inserts
    /// a pending payout and marks exactly the summed records paid.
    async fn settle_pending(&self, provider_id: &str, plan: &PayoutPlan) -> AppResult<Settlement>;
}

#[async_trait]
pub trait PayoutStore: Send + Sync {
    async fn insert(&self, payout: Payout) -> AppResult<Payout>;
    async fn get(&self, payout_id: &str) -> AppResult<Option<Payout>>;
    /// Matching payouts, newest first.
    async fn list(&self, filter: &PayoutFilter) -> AppResult<Vec<Payout>>;
    /// Applies the update; a failed or cancelled payout releases its ledger rows.
    async fn update(
        &self,
        payout_id: &str,
        update: PayoutUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Payout>;
    async fn delete(&self, payout_id: &str) -> AppResult<()>;
}
