use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::app::auth::AuthUser;
use crate::app::error::{AppError, AppResult};
use crate::app::state::AppState;
use crate::models::payout::{NewPayout, Payout, PayoutFilter, PayoutUpdate};

pub async fn list_payouts(
    user: AuthUser,
    State(state): State<AppState>,
    Query(mut filter): Query<PayoutFilter>,
) -> AppResult<Json<Vec<Payout>>> {
    if !user.is_admin() {
        // Providers only ever see their own payouts
        let own = user.own_provider_id().ok_or(AppError::Forbidden)?;
        if filter.provider_id.as_deref().is_some_and(|requested| requested != own) {
            return Err(AppError::Forbidden);
        }
        filter.provider_id = Some(own.to_string());
    }

    Ok(Json(state.payouts.list(&filter).await?))
}

pub async fn get_payout(
    user: AuthUser,
    State(state): State<AppState>,
    Path(payout_id): Path<String>,
) -> AppResult<Json<Payout>> {
    // Papéis sem acesso a payouts não descobrem se o id existe
    if !user.is_admin() && user.own_provider_id().is_none() {
        return Err(AppError::Forbidden);
    }
    let payout = state.payouts.get(&payout_id).await?;
    user.require_admin_or_provider(&payout.provider_id)?;
    Ok(Json(payout))
}

pub async fn create_payout(
    user: AuthUser,
    State(state): State<AppState>,
    Json(request): Json<NewPayout>,
) -> AppResult<(StatusCode, Json<Payout>)> {
    user.require_admin()?;
    let payout = state.payouts.create(request).await?;
    Ok((StatusCode::CREATED, Json(payout)))
}

pub async fn update_payout(
    user: AuthUser,
    State(state): State<AppState>,
    Path(payout_id): Path<String>,
    Json(update): Json<PayoutUpdate>,
) -> AppResult<Json<Payout>> {
    user.require_admin()?;
    Ok(Json(state.payouts.update(&payout_id, update).await?))
}

pub async fn delete_payout(
    user: AuthUser,
    State(state): State<AppState>,
    Path(payout_id): Path<String>,
) -> AppResult<StatusCode> {
    user.require_admin()?;
    state.payouts.delete(&payout_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
