use axum::{
    routing::{get, post},
    Router,
};

use crate::app::state::AppState;
use crate::handlers::{commission, metrics, payouts};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(metrics::health_handler))
        .route("/metrics", get(metrics::get_metrics))
        .route(
            "/commission/process/:booking_id",
            post(commission::process_booking),
        )
        .route("/commission/analytics", get(commission::analytics))
        .route("/commission/dashboard", get(commission::dashboard))
        .route(
            "/commission/provider/:provider_id",
            get(commission::provider_report),
        )
        .route(
            "/commission/payout/:provider_id",
            post(commission::process_payout),
        )
        .route(
            "/commission/pending-payout/:provider_id",
            get(commission::pending_payout),
        )
        .route(
            "/commission/schedule-payouts",
            post(commission::schedule_payouts),
        )
        .route(
            "/payouts",
            get(payouts::list_payouts).post(payouts::create_payout),
        )
        .route(
            "/payouts/:payout_id",
            get(payouts::get_payout)
                .put(payouts::update_payout)
                .delete(payouts::delete_payout),
        )
        .with_state(state)
}
