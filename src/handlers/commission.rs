use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::app::auth::AuthUser;
use crate::app::error::AppResult;
use crate::app::state::AppState;
use crate::models::commission::CommissionRecord;
use crate::models::payout::Payout;
use crate::models::report::{
    BatchReport, CommissionAnalytics, CommissionDashboard, PendingPayout, ProviderCommissionReport,
};
use crate::utils::period::Period;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    #[serde(rename = "dateFrom")]
    date_from: Option<String>,
    #[serde(rename = "dateTo")]
    date_to: Option<String>,
}

impl PeriodQuery {
    fn period(&self) -> AppResult<Period> {
        Period::parse(self.date_from.as_deref(), self.date_to.as_deref())
    }
}

pub async fn process_booking(
    user: AuthUser,
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
) -> AppResult<Json<CommissionRecord>> {
    user.require_admin()?;
    info!("Processing commission for booking {}", booking_id);

    let record = state.commissions.process_booking_commission(&booking_id).await?;
    Ok(Json(record))
}

pub async fn analytics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<CommissionAnalytics>> {
    user.require_admin()?;
    Ok(Json(state.commissions.analytics(query.period()?).await?))
}

pub async fn dashboard(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<CommissionDashboard>> {
    user.require_admin()?;
    Ok(Json(state.commissions.dashboard(Utc::now()).await?))
}

pub async fn provider_report(
    user: AuthUser,
    State(state): State<AppState>,
    Path(provider_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> AppResult<Json<ProviderCommissionReport>> {
    user.require_admin_or_provider(&provider_id)?;
    let report = state
        .commissions
        .provider_report(&provider_id, query.period()?)
        .await?;
    Ok(Json(report))
}

pub async fn process_payout(
    user: AuthUser,
    State(state): State<AppState>,
    Path(provider_id): Path<String>,
) -> AppResult<(StatusCode, Json<Payout>)> {
    user.require_admin()?;
    info!("Manual payout requested for provider {} by {}", provider_id, user.subject);

    let payout = state.batcher.process_auto_payout(&provider_id).await?;
    Ok((StatusCode::CREATED, Json(payout)))
}

pub async fn pending_payout(
    user: AuthUser,
    State(state): State<AppState>,
    Path(provider_id): Path<String>,
) -> AppResult<Json<PendingPayout>> {
    user.require_admin_or_provider(&provider_id)?;
    let pending_amount = state.batcher.calculate_pending_payout(&provider_id).await?;
    Ok(Json(PendingPayout {
        provider_id,
        pending_amount,
    }))
}

pub async fn schedule_payouts(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<BatchReport>> {
    user.require_admin()?;
    Ok(Json(state.batcher.schedule_auto_payouts().await?))
}
