use serde::Serialize;

use crate::models::commission::CommissionRecord;
use crate::models::payout::Payout;
use crate::utils::money::effective_rate_percent;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTotals {
    pub total_revenue_cents: u64,
    pub total_commission_cents: u64,
    pub total_provider_earnings_cents: u64,
    pub bookings: u64,
}

impl CommissionTotals {
    pub fn add(&mut self, record: &CommissionRecord) {
        // Relatórios saturam em vez de estourar
        self.total_revenue_cents = self.total_revenue_cents.saturating_add(record.total_cents);
        self.total_commission_cents = self
            .total_commission_cents
            .saturating_add(record.commission_cents);
        self.total_provider_earnings_cents = self
            .total_provider_earnings_cents
            .saturating_add(record.provider_earning_cents);
        self.bookings = self.bookings.saturating_add(1);
    }

    pub fn average_rate_percent(&self) -> f64 {
        effective_rate_percent(self.total_commission_cents, self.total_revenue_cents)
    }
}

impl<'a> FromIterator<&'a CommissionRecord> for CommissionTotals {
    fn from_iter<I: IntoIterator<Item = &'a CommissionRecord>>(iter: I) -> Self {
        let mut totals = Self::default();
        for record in iter {
            totals.add(record);
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEarnings {
    pub provider_id: String,
    pub total_earning_cents: u64,
    pub total_commission_cents: u64,
    pub bookings: u64,
}

impl ProviderEarnings {
    pub fn new(provider_id: impl Into<String>) -> Self {
        Self {
            provider_id: provider_id.into(),
            total_earning_cents: 0,
            total_commission_cents: 0,
            bookings: 0,
        }
    }

    pub fn add(&mut self, record: &CommissionRecord) {
        self.total_earning_cents = self
            .total_earning_cents
            .saturating_add(record.provider_earning_cents);
        self.total_commission_cents = self
            .total_commission_cents
            .saturating_add(record.commission_cents);
        self.bookings = self.bookings.saturating_add(1);
    }
}

/// Sum of cent amounts, clamped at `u64::MAX`.
pub fn saturating_total(amounts: impl IntoIterator<Item = u64>) -> u64 {
    amounts
        .into_iter()
        .fold(0u64, |acc, amount| acc.saturating_add(amount))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionAnalytics {
    #[serde(flatten)]
    pub totals: CommissionTotals,
    pub average_commission_rate: f64,
    pub top_providers: Vec<ProviderEarnings>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayoutSummary {
    pub amount_cents: u64,
    pub providers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionDashboard {
    pub today: CommissionTotals,
    pub month: CommissionTotals,
    pub pending_payouts: PendingPayoutSummary,
    pub recent: Vec<CommissionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCommissionReport {
    pub provider_id: String,
    pub provider_name: String,
    #[serde(flatten)]
    pub totals: CommissionTotals,
    pub pending_earnings_cents: u64,
    pub paid_earnings_cents: u64,
    pub records: Vec<CommissionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayout {
    pub provider_id: String,
    pub pending_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedProvider {
    pub provider_id: String,
    pub reason: String,
}

/// Outcome of one `schedule_auto_payouts` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub eligible: usize,
    pub succeeded: Vec<Payout>,
    pub failed: Vec<FailedProvider>,
}
