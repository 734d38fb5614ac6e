use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::app::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: PayoutStatus) -> bool {
        use PayoutStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Processing, Completed)
                | (Processing, Failed)
        )
    }

    /// Failed and cancelled payouts hand their earnings back to the ledger.
    pub fn releases_ledger(&self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: String,
    pub provider_id: String,
    pub amount_cents: u64,
    pub status: PayoutStatus,
    pub transaction_id: Option<String>,
    pub payout_method: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub failure_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payout {
    pub fn new(request: NewPayout, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider_id: request.provider_id,
            amount_cents: request.amount_cents,
            status: PayoutStatus::Pending,
            transaction_id: None,
            payout_method: request.payout_method,
            scheduled_at: request.scheduled_at,
            processed_at: None,
            failure_reason: None,
            notes: request.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update. Status changes go through the state machine;
    /// nothing is modified when the transition is rejected.
    pub fn apply(&mut self, update: PayoutUpdate, now: DateTime<Utc>) -> AppResult<()> {
        if let Some(next) = update.status {
            if next != self.status {
                if !self.status.can_transition_to(next) {
                    return Err(AppError::InvalidTransition {
                        from: self.status,
                        to: next,
                    });
                }
                self.status = next;
                if matches!(next, PayoutStatus::Completed | PayoutStatus::Failed) {
                    self.processed_at = Some(now);
                }
            }
        }

        if let Some(transaction_id) = update.transaction_id {
            self.transaction_id = Some(transaction_id);
        }
        if let Some(method) = update.payout_method {
            self.payout_method = Some(method);
        }
        if let Some(scheduled_at) = update.scheduled_at {
            self.scheduled_at = Some(scheduled_at);
        }
        if let Some(reason) = update.failure_reason {
            self.failure_reason = Some(reason);
        }
        if let Some(notes) = update.notes {
            self.notes = Some(notes);
        }
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayout {
    pub provider_id: String,
    pub amount_cents: u64,
    #[serde(default)]
    pub payout_method: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutUpdate {
    #[serde(default)]
    pub status: Option<PayoutStatus>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payout_method: Option<String>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutFilter {
    pub provider_id: Option<String>,
    pub status: Option<PayoutStatus>,
}

impl PayoutFilter {
    pub fn matches(&self, payout: &Payout) -> bool {
        self.provider_id
            .as_deref()
            .map_or(true, |id| payout.provider_id == id)
            && self.status.map_or(true, |status| payout.status == status)
    }
}
