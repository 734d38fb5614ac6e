use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Processed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerPayoutStatus {
    Pending,
    Paid,
}

/// Result of pricing a booking, before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionQuote {
    pub booking_id: String,
    pub provider_id: String,
    pub customer_id: String,
    pub total_cents: u64,
    pub commission_cents: u64,
    pub provider_earning_cents: u64,
    pub commission_rate_bps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRecord {
    pub id: String,
    pub booking_id: String,
    pub provider_id: String,
    pub customer_id: String,
    pub total_cents: u64,
    pub commission_cents: u64,
    pub provider_earning_cents: u64,
    pub commission_rate_bps: u32,
    pub status: CommissionStatus,
    pub payout_status: LedgerPayoutStatus,
    pub payout_id: Option<String>,
    pub processed_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl CommissionRecord {
    pub fn from_quote(quote: CommissionQuote, processed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: quote.booking_id,
            provider_id: quote.provider_id,
            customer_id: quote.customer_id,
            total_cents: quote.total_cents,
            commission_cents: quote.commission_cents,
            provider_earning_cents: quote.provider_earning_cents,
            commission_rate_bps: quote.commission_rate_bps,
            status: CommissionStatus::Processed,
            payout_status: LedgerPayoutStatus::Pending,
            payout_id: None,
            processed_at,
            paid_at: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.payout_status == LedgerPayoutStatus::Pending
    }

    pub fn mark_paid(&mut self, payout_id: &str, at: DateTime<Utc>) {
        self.payout_status = LedgerPayoutStatus::Paid;
        self.payout_id = Some(payout_id.to_string());
        self.paid_at = Some(at);
    }

    pub fn release(&mut self) {
        self.payout_status = LedgerPayoutStatus::Pending;
        self.payout_id = None;
        self.paid_at = None;
    }
}
