use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use crate::app::error::{AppError, AppResult};
use crate::models::payout::{NewPayout, Payout, PayoutFilter, PayoutUpdate};
use crate::store::{BookingDirectory, PayoutStore};

/// Plain persistence for payout records. Status changes are checked against
/// the payout state machine by the store.
pub struct PayoutService {
    directory: Arc<dyn BookingDirectory>,
    payouts: Arc<dyn PayoutStore>,
}

impl PayoutService {
    pub fn new(directory: Arc<dyn BookingDirectory>, payouts: Arc<dyn PayoutStore>) -> Self {
        Self { directory, payouts }
    }

    pub async fn create(&self, request: NewPayout) -> AppResult<Payout> {
        if request.amount_cents == 0 {
            return Err(AppError::InvalidInput(
                "amountCents must be greater than zero".to_string(),
            ));
        }
        if self.directory.provider(&request.provider_id).await?.is_none() {
            return Err(AppError::not_found(format!("provider {}", request.provider_id)));
        }

        let payout = self.payouts.insert(Payout::new(request, Utc::now())).await?;
        info!(payout_id = %payout.id, provider_id = %payout.provider_id, "payout created manually");
        Ok(payout)
    }

    pub async fn get(&self, payout_id: &str) -> AppResult<Payout> {
        self.payouts
            .get(payout_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("payout {payout_id}")))
    }

    pub async fn list(&self, filter: &PayoutFilter) -> AppResult<Vec<Payout>> {
        self.payouts.list(filter).await
    }

    pub async fn update(&self, payout_id: &str, update: PayoutUpdate) -> AppResult<Payout> {
        let payout = self.payouts.update(payout_id, update, Utc::now()).await?;
        info!(payout_id, status = %payout.status, "payout updated");
        Ok(payout)
    }

    pub async fn delete(&self, payout_id: &str) -> AppResult<()> {
        self.payouts.delete(payout_id).await?;
        info!(payout_id, "payout deleted");
        Ok(())
    }
}
