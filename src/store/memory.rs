use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use crate::app::error::{AppError, AppResult};
use crate::models::booking::{Booking, Provider};
use crate::models::commission::CommissionRecord;
use crate::models::payout::{NewPayout, Payout, PayoutFilter, PayoutUpdate};
use crate::store::{
    BookingDirectory, CommissionLedger, LedgerFilter, PayoutPlan, PayoutStore, Settlement,
};

// Commission rows and payouts live behind one lock so that a payout and the
// ledger rows it pays are always written together.
#[derive(Default)]
struct LedgerTables {
    commissions: HashMap<String, CommissionRecord>,
    by_booking: HashMap<String, String>,
    payouts: HashMap<String, Payout>,
}

impl LedgerTables {
    fn linked_records(&self, payout_id: &str) -> impl Iterator<Item = &CommissionRecord> + '_ {
        let payout_id = payout_id.to_string();
        self.commissions
            .values()
            .filter(move |record| record.payout_id.as_deref() == Some(payout_id.as_str()))
    }
}

fn overflow() -> AppError {
    AppError::Internal("pending earnings overflow u64 cents".to_string())
}

fn checked_sum(mut amounts: impl Iterator<Item = u64>) -> AppResult<u64> {
    amounts.try_fold(0u64, |acc, amount| acc.checked_add(amount).ok_or_else(overflow))
}

#[derive(Default)]
pub struct MemoryStore {
    providers: DashMap<String, Provider>,
    bookings: DashMap<String, Booking>,
    ledger: RwLock<LedgerTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_provider(&self, provider: Provider) {
        self.providers.insert(provider.id.clone(), provider);
    }

    pub fn upsert_booking(&self, booking: Booking) {
        self.bookings.insert(booking.id.clone(), booking);
    }

    pub fn remove_provider(&self, provider_id: &str) -> Option<Provider> {
        self.providers.remove(provider_id).map(|(_, provider)| provider)
    }
}

#[async_trait]
impl BookingDirectory for MemoryStore {
    async fn booking(&self, booking_id: &str) -> AppResult<Option<Booking>> {
        Ok(self.bookings.get(booking_id).map(|entry| entry.clone()))
    }

    async fn provider(&self, provider_id: &str) -> AppResult<Option<Provider>> {
        Ok(self.providers.get(provider_id).map(|entry| entry.clone()))
    }
}

#[async_trait]
impl CommissionLedger for MemoryStore {
    async fn find_by_booking(&self, booking_id: &str) -> AppResult<Option<CommissionRecord>> {
        let tables = self.ledger.read();
        Ok(tables
            .by_booking
            .get(booking_id)
            .and_then(|id| tables.commissions.get(id))
            .cloned())
    }

    async fn insert_if_absent(
        &self,
        record: CommissionRecord,
    ) -> AppResult<(CommissionRecord, bool)> {
        let mut tables = self.ledger.write();

        if let Some(existing) = tables
            .by_booking
            .get(&record.booking_id)
            .and_then(|id| tables.commissions.get(id))
        {
            return Ok((existing.clone(), false));
        }

        tables
            .by_booking
            .insert(record.booking_id.clone(), record.id.clone());
        tables.commissions.insert(record.id.clone(), record.clone());
        Ok((record, true))
    }

    async fn records(&self, filter: &LedgerFilter) -> AppResult<Vec<CommissionRecord>> {
        let mut records: Vec<CommissionRecord> = self
            .ledger
            .read()
            .commissions
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by(|a, b| {
            b.processed_at
                .cmp(&a.processed_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    async fn pending_total(&self, provider_id: &str) -> AppResult<u64> {
        let tables = self.ledger.read();
        checked_sum(
            tables
                .commissions
                .values()
                .filter(|record| record.provider_id == provider_id && record.is_pending())
                .map(|record| record.provider_earning_cents),
        )
    }

    async fn pending_by_provider(&self) -> AppResult<Vec<(String, u64)>> {
        let mut totals: BTreeMap<String, u64> = BTreeMap::new();
        for record in self.ledger.read().commissions.values() {
            if record.is_pending() {
                let total = totals.entry(record.provider_id.clone()).or_default();
                *total = total
                    .checked_add(record.provider_earning_cents)
                    .ok_or_else(overflow)?;
            }
        }
        Ok(totals.into_iter().collect())
    }

    async fn settle_pending(&self, provider_id: &str, plan: &PayoutPlan) -> AppResult<Settlement> {
        let mut tables = self.ledger.write();

        let record_ids: Vec<String> = tables
            .commissions
            .values()
            .filter(|record| record.provider_id == provider_id && record.is_pending())
            .map(|record| record.id.clone())
            .collect();
        let pending = checked_sum(
            record_ids
                .iter()
                .filter_map(|id| tables.commissions.get(id))
                .map(|record| record.provider_earning_cents),
        )?;

        // Nunca cria payout vazio, mesmo com mínimo zero
        if record_ids.is_empty() || pending == 0 || pending < plan.minimum_cents {
            return Err(AppError::InsufficientPayoutAmount {
                pending,
                minimum: plan.minimum_cents,
            });
        }

        let payout = Payout::new(
            NewPayout {
                provider_id: provider_id.to_string(),
                amount_cents: pending,
                payout_method: Some(plan.payout_method.clone()),
                scheduled_at: Some(plan.now),
                notes: Some(format!(
                    "auto payout for {} commission records",
                    record_ids.len()
                )),
            },
            plan.now,
        );

        for id in &record_ids {
            if let Some(record) = tables.commissions.get_mut(id) {
                record.mark_paid(&payout.id, plan.now);
            }
        }
        tables.payouts.insert(payout.id.clone(), payout.clone());

        Ok(Settlement { payout, record_ids })
    }
}

#[async_trait]
impl PayoutStore for MemoryStore {
    async fn insert(&self, payout: Payout) -> AppResult<Payout> {
        let mut tables = self.ledger.write();
        if tables.payouts.contains_key(&payout.id) {
            return Err(AppError::Conflict(format!("payout {} already exists", payout.id)));
        }
        tables.payouts.insert(payout.id.clone(), payout.clone());
        Ok(payout)
    }

    async fn get(&self, payout_id: &str) -> AppResult<Option<Payout>> {
        Ok(self.ledger.read().payouts.get(payout_id).cloned())
    }

    async fn list(&self, filter: &PayoutFilter) -> AppResult<Vec<Payout>> {
        let mut payouts: Vec<Payout> = self
            .ledger
            .read()
            .payouts
            .values()
            .filter(|payout| filter.matches(payout))
            .cloned()
            .collect();
        payouts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(payouts)
    }

    async fn update(
        &self,
        payout_id: &str,
        update: PayoutUpdate,
        now: DateTime<Utc>,
    ) -> AppResult<Payout> {
        let mut tables = self.ledger.write();

        let payout = tables
            .payouts
            .get_mut(payout_id)
            .ok_or_else(|| AppError::not_found(format!("payout {payout_id}")))?;
        let previous = payout.status;
        payout.apply(update, now)?;
        let payout = payout.clone();

        if payout.status != previous && payout.status.releases_ledger() {
            for record in tables.commissions.values_mut() {
                if record.payout_id.as_deref() == Some(payout_id) {
                    record.release();
                }
            }
        }

        Ok(payout)
    }

    async fn delete(&self, payout_id: &str) -> AppResult<()> {
        let mut tables = self.ledger.write();

        if !tables.payouts.contains_key(payout_id) {
            return Err(AppError::not_found(format!("payout {payout_id}")));
        }
        let linked = tables.linked_records(payout_id).count();
        if linked > 0 {
            return Err(AppError::Conflict(format!(
                "payout {payout_id} still pays {linked} commission records"
            )));
        }

        tables.payouts.remove(payout_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::commission::{CommissionQuote, LedgerPayoutStatus};
    use crate::models::payout::PayoutStatus;

    fn record(booking_id: &str, provider_id: &str, earning: u64) -> CommissionRecord {
        CommissionRecord::from_quote(
            CommissionQuote {
                booking_id: booking_id.to_string(),
                provider_id: provider_id.to_string(),
                customer_id: "c-1".to_string(),
                total_cents: earning,
                commission_cents: 0,
                provider_earning_cents: earning,
                commission_rate_bps: 0,
            },
            Utc::now(),
        )
    }

    fn plan(minimum_cents: u64) -> PayoutPlan {
        PayoutPlan {
            minimum_cents,
            payout_method: "bank_transfer".to_string(),
            now: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_if_absent_keeps_first_record() {
        let store = MemoryStore::new();
        let (first, created) = store.insert_if_absent(record("b-1", "p-1", 100)).await.unwrap();
        assert!(created);

        let (second, created) = store.insert_if_absent(record("b-1", "p-1", 999)).await.unwrap();
        assert!(!created);
        assert_eq!(second, first);
        assert_eq!(store.records(&LedgerFilter::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn settle_below_minimum_changes_nothing() {
        let store = MemoryStore::new();
        store.insert_if_absent(record("b-1", "p-1", 8_000)).await.unwrap();

        let err = store.settle_pending("p-1", &plan(10_000)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientPayoutAmount {
                pending: 8_000,
                minimum: 10_000
            }
        ));
        assert_eq!(store.pending_total("p-1").await.unwrap(), 8_000);
        assert!(store.list(&PayoutFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn settle_never_creates_an_empty_payout() {
        let store = MemoryStore::new();

        let err = store.settle_pending("p-1", &plan(0)).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientPayoutAmount {
                pending: 0,
                minimum: 0
            }
        ));

        // Linhas com ganho zero também não geram payout
        store.insert_if_absent(record("b-1", "p-1", 0)).await.unwrap();
        assert!(store.settle_pending("p-1", &plan(0)).await.is_err());
        assert!(store.list(&PayoutFilter::default()).await.unwrap().is_empty());
        assert!(store.find_by_booking("b-1").await.unwrap().unwrap().is_pending());
    }

    #[tokio::test]
    async fn overflowing_pending_total_is_an_internal_error() {
        let store = MemoryStore::new();
        store.insert_if_absent(record("b-1", "p-1", u64::MAX)).await.unwrap();
        store.insert_if_absent(record("b-2", "p-1", 1)).await.unwrap();

        assert!(matches!(
            store.pending_total("p-1").await,
            Err(AppError::Internal(_))
        ));
        assert!(matches!(
            store.pending_by_provider().await,
            Err(AppError::Internal(_))
        ));
        assert!(matches!(
            store.settle_pending("p-1", &plan(10_000)).await,
            Err(AppError::Internal(_))
        ));
        assert!(store.list(&PayoutFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn settle_only_touches_the_providers_pending_rows() {
        let store = MemoryStore::new();
        store.insert_if_absent(record("b-1", "p-1", 6_000)).await.unwrap();
        store.insert_if_absent(record("b-2", "p-1", 6_000)).await.unwrap();
        store.insert_if_absent(record("b-3", "p-2", 6_000)).await.unwrap();

        let settlement = store.settle_pending("p-1", &plan(10_000)).await.unwrap();
        assert_eq!(settlement.payout.amount_cents, 12_000);
        assert_eq!(settlement.record_ids.len(), 2);
        assert_eq!(store.pending_total("p-1").await.unwrap(), 0);
        assert_eq!(store.pending_total("p-2").await.unwrap(), 6_000);
        assert_eq!(
            store.pending_by_provider().await.unwrap(),
            vec![("p-2".to_string(), 6_000)]
        );
    }

    #[tokio::test]
    async fn cancelling_a_payout_releases_its_records() {
        let store = MemoryStore::new();
        store.insert_if_absent(record("b-1", "p-1", 12_000)).await.unwrap();
        let settlement = store.settle_pending("p-1", &plan(10_000)).await.unwrap();

        let payout = store
            .update(
                &settlement.payout.id,
                PayoutUpdate {
                    status: Some(PayoutStatus::Cancelled),
                    ..Default::default()
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(payout.status, PayoutStatus::Cancelled);

        let released = store.find_by_booking("b-1").await.unwrap().unwrap();
        assert_eq!(released.payout_status, LedgerPayoutStatus::Pending);
        assert_eq!(released.payout_id, None);
        assert_eq!(store.pending_total("p-1").await.unwrap(), 12_000);

        // Sem linhas vinculadas, agora pode ser apagado
        store.delete(&settlement.payout.id).await.unwrap();
        assert!(store.get(&settlement.payout.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_refuses_payouts_with_linked_records() {
        let store = MemoryStore::new();
        store.insert_if_absent(record("b-1", "p-1", 12_000)).await.unwrap();
        let settlement = store.settle_pending("p-1", &plan(10_000)).await.unwrap();

        let err = store.delete(&settlement.payout.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(matches!(
            store.delete("missing").await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn directory_lookups() {
        let store = MemoryStore::new();
        store.upsert_provider(Provider {
            id: "p-1".to_string(),
            name: "Ana's Cleaning".to_string(),
            commission_rate_bps: None,
        });
        assert!(store.provider("p-1").await.unwrap().is_some());
        assert!(store.remove_provider("p-1").is_some());
        assert!(store.provider("p-1").await.unwrap().is_none());
        assert!(store.booking("b-404").await.unwrap().is_none());
    }
}
