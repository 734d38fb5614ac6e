use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::app::error::{AppError, AppResult};
use crate::models::commission::{CommissionQuote, CommissionRecord};
use crate::models::report::{
    CommissionAnalytics, CommissionDashboard, CommissionTotals, PendingPayoutSummary,
    saturating_total, ProviderCommissionReport, ProviderEarnings,
};
use crate::services::atomic_metrics::AtomicMetrics;
use crate::store::{BookingDirectory, CommissionLedger, LedgerFilter};
use crate::utils::money::{format_currency, split_total, BPS_DENOMINATOR};
use crate::utils::period::Period;

const TOP_PROVIDERS: usize = 10;
const RECENT_RECORDS: usize = 10;

pub struct CommissionService {
    directory: Arc<dyn BookingDirectory>,
    ledger: Arc<dyn CommissionLedger>,
    default_rate_bps: u32,
    metrics: Arc<AtomicMetrics>,
}

impl CommissionService {
    pub fn new(
        directory: Arc<dyn BookingDirectory>,
        ledger: Arc<dyn CommissionLedger>,
        default_rate_bps: u32,
        metrics: Arc<AtomicMetrics>,
    ) -> Self {
        Self {
            directory,
            ledger,
            default_rate_bps,
            metrics,
        }
    }

    /// Prices a booking with its provider's current rate. Nothing is stored.
    pub async fn calculate_commission(&self, booking_id: &str) -> AppResult<CommissionQuote> {
        let booking = self
            .directory
            .booking(booking_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("booking {booking_id}")))?;
        let provider = self
            .directory
            .provider(&booking.provider_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("provider {}", booking.provider_id)))?;

        let rate_bps = provider.commission_rate_bps.unwrap_or(self.default_rate_bps);
        if u64::from(rate_bps) > BPS_DENOMINATOR {
            return Err(AppError::InvalidInput(format!(
                "provider {} has commission rate {rate_bps} bps, above {BPS_DENOMINATOR}",
                provider.id
            )));
        }
        let (commission, earning) = split_total(booking.total_cents, rate_bps);

        Ok(CommissionQuote {
            booking_id: booking.id,
            provider_id: provider.id,
            customer_id: booking.customer_id,
            total_cents: booking.total_cents,
            commission_cents: commission,
            provider_earning_cents: earning,
            commission_rate_bps: rate_bps,
        })
    }

    /// Records the commission for a booking once. Repeated calls return the
    /// stored record untouched.
    pub async fn process_booking_commission(&self, booking_id: &str) -> AppResult<CommissionRecord> {
        if let Some(existing) = self.ledger.find_by_booking(booking_id).await? {
            debug!(booking_id, "commission already processed");
            self.metrics.increment_commissions_reused();
            return Ok(existing);
        }

        let quote = self.calculate_commission(booking_id).await?;
        let (record, created) = self
            .ledger
            .insert_if_absent(CommissionRecord::from_quote(quote, Utc::now()))
            .await?;

        if created {
            self.metrics.increment_commissions_processed();
            info!(
                booking_id,
                provider_id = %record.provider_id,
                commission = %format_currency(record.commission_cents),
                earning = %format_currency(record.provider_earning_cents),
                "commission processed"
            );
        } else {
            self.metrics.increment_commissions_reused();
        }

        Ok(record)
    }

    pub async fn analytics(&self, period: Period) -> AppResult<CommissionAnalytics> {
        let records = self
            .ledger
            .records(&LedgerFilter {
                period,
                ..Default::default()
            })
            .await?;

        let totals: CommissionTotals = records.iter().collect();

        let mut by_provider: HashMap<&str, ProviderEarnings> = HashMap::new();
        for record in &records {
            by_provider
                .entry(record.provider_id.as_str())
                .or_insert_with(|| ProviderEarnings::new(record.provider_id.as_str()))
                .add(record);
        }

        let mut top_providers: Vec<ProviderEarnings> = by_provider.into_values().collect();
        top_providers.sort_by(|a, b| {
            b.total_earning_cents
                .cmp(&a.total_earning_cents)
                .then_with(|| a.provider_id.cmp(&b.provider_id))
        });
        top_providers.truncate(TOP_PROVIDERS);

        Ok(CommissionAnalytics {
            average_commission_rate: totals.average_rate_percent(),
            totals,
            top_providers,
        })
    }

    pub async fn dashboard(&self, now: DateTime<Utc>) -> AppResult<CommissionDashboard> {
        let records = self.ledger.records(&LedgerFilter::default()).await?;

        let today_window = Period::day_of(now);
        let month_window = Period::month_of(now);
        let today = records
            .iter()
            .filter(|record| today_window.contains(record.processed_at))
            .collect();
        let month = records
            .iter()
            .filter(|record| month_window.contains(record.processed_at))
            .collect();

        let pending = self.ledger.pending_by_provider().await?;
        let pending_payouts = PendingPayoutSummary {
            amount_cents: saturating_total(pending.iter().map(|(_, amount)| *amount)),
            providers: pending.len() as u64,
        };

        let recent = records.into_iter().take(RECENT_RECORDS).collect();

        Ok(CommissionDashboard {
            today,
            month,
            pending_payouts,
            recent,
        })
    }

    pub async fn provider_report(
        &self,
        provider_id: &str,
        period: Period,
    ) -> AppResult<ProviderCommissionReport> {
        let provider = self
            .directory
            .provider(provider_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("provider {provider_id}")))?;

        let records = self
            .ledger
            .records(&LedgerFilter {
                provider_id: Some(provider_id.to_string()),
                payout_status: None,
                period,
            })
            .await?;

        let totals: CommissionTotals = records.iter().collect();
        let (pending, paid): (Vec<&CommissionRecord>, Vec<&CommissionRecord>) =
            records.iter().partition(|record| record.is_pending());

        Ok(ProviderCommissionReport {
            provider_id: provider.id,
            provider_name: provider.name,
            totals,
            pending_earnings_cents: saturating_total(pending.iter().map(|r| r.provider_earning_cents)),
            paid_earnings_cents: saturating_total(paid.iter().map(|r| r.provider_earning_cents)),
            records,
        })
    }
}
