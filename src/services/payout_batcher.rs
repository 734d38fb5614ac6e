use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::error::{AppError, AppResult};
use crate::models::payout::Payout;
use crate::models::report::{BatchReport, FailedProvider};
use crate::services::atomic_metrics::AtomicMetrics;
use crate::store::{BookingDirectory, CommissionLedger, PayoutPlan};
use crate::utils::money::format_currency;

pub const AUTO_PAYOUT_METHOD: &str = "bank_transfer";

pub struct PayoutBatcher {
    directory: Arc<dyn BookingDirectory>,
    ledger: Arc<dyn CommissionLedger>,
    minimum_cents: u64,
    metrics: Arc<AtomicMetrics>,
}

impl PayoutBatcher {
    pub fn new(
        directory: Arc<dyn BookingDirectory>,
        ledger: Arc<dyn CommissionLedger>,
        minimum_cents: u64,
        metrics: Arc<AtomicMetrics>,
    ) -> Self {
        Self {
            directory,
            ledger,
            minimum_cents,
            metrics,
        }
    }

    pub fn minimum_cents(&self) -> u64 {
        self.minimum_cents
    }

    pub async fn calculate_pending_payout(&self, provider_id: &str) -> AppResult<u64> {
        self.ledger.pending_total(provider_id).await
    }

    pub async fn process_auto_payout(&self, provider_id: &str) -> AppResult<Payout> {
        if self.directory.provider(provider_id).await?.is_none() {
            return Err(AppError::not_found(format!("provider {provider_id}")));
        }

        let plan = PayoutPlan {
            minimum_cents: self.minimum_cents,
            payout_method: AUTO_PAYOUT_METHOD.to_string(),
            now: Utc::now(),
        };

        match self.ledger.settle_pending(provider_id, &plan).await {
            Ok(settlement) => {
                self.metrics.increment_payouts_created();
                info!(
                    provider_id,
                    payout_id = %settlement.payout.id,
                    amount = %format_currency(settlement.payout.amount_cents),
                    records = settlement.record_ids.len(),
                    "payout created"
                );
                Ok(settlement.payout)
            }
            Err(err @ AppError::InsufficientPayoutAmount { .. }) => {
                self.metrics.increment_payouts_rejected();
                info!(provider_id, "payout rejected: {}", err);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Pays every provider whose pending earnings clear the minimum. Runs
    /// providers one after another; a failing provider is logged and skipped.
    pub async fn schedule_auto_payouts(&self) -> AppResult<BatchReport> {
        self.metrics.increment_batch_runs();

        let eligible: Vec<String> = self
            .ledger
            .pending_by_provider()
            .await?
            .into_iter()
            .filter(|(_, pending)| *pending > 0 && *pending >= self.minimum_cents)
            .map(|(provider_id, _)| provider_id)
            .collect();

        info!("Starting auto payout batch for {} providers", eligible.len());

        let mut report = BatchReport {
            eligible: eligible.len(),
            ..Default::default()
        };

        for provider_id in eligible {
            match self.process_auto_payout(&provider_id).await {
                Ok(payout) => report.succeeded.push(payout),
                Err(err) => {
                    self.metrics.increment_batch_failures();
                    warn!(provider_id = %provider_id, error = %err, "auto payout failed");
                    report.failed.push(FailedProvider {
                        provider_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "auto payout batch finished"
        );
        Ok(report)
    }
}
