//! HTTP tests: role gating, commission processing and payout batching through the router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use payout_ledger::app::auth::{Claims, JwtKeys, Role};
use payout_ledger::models::booking::{Booking, Provider};
use payout_ledger::store::MemoryStore;
use payout_ledger::{build_router, AppState, Config};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

fn test_app() -> TestApp {
    let config = Config {
        jwt_secret: SECRET.to_string(),
        ..Config::default()
    };

    let store = Arc::new(MemoryStore::new());
    for (id, rate) in [("p-1", None), ("p-2", Some(2_000))] {
        store.upsert_provider(Provider {
            id: id.to_string(),
            name: format!("Provider {id}"),
            commission_rate_bps: rate,
        });
    }

    TestApp {
        router: build_router(AppState::new(&config, store.clone())),
        store,
    }
}

impl TestApp {
    fn add_booking(&self, id: &str, provider_id: &str, total_cents: u64) {
        self.store.upsert_booking(Booking {
            id: id.to_string(),
            provider_id: provider_id.to_string(),
            customer_id: "c-1".to_string(),
            service_name: "Haircut".to_string(),
            total_cents,
            completed_at: Some(Utc::now()),
        });
    }

    async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }
}

fn token(role: Role, provider_id: Option<&str>) -> String {
    JwtKeys::from_secret(SECRET)
        .issue(&Claims::new(
            "tester",
            role,
            provider_id.map(str::to_string),
            Duration::hours(1),
        ))
        .expect("token")
}

fn admin() -> String {
    token(Role::Admin, None)
}

#[tokio::test]
async fn health_and_metrics_are_public() {
    let app = test_app();
    let (status, _) = app.send("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send("GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payoutsCreated"], 0);
}

#[tokio::test]
async fn missing_or_bad_token_is_401() {
    let app = test_app();
    let (status, body) = app.send("GET", "/commission/dashboard", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = app
        .send("GET", "/payouts", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn process_booking_is_admin_only_and_idempotent() {
    let app = test_app();
    app.add_booking("b-1", "p-1", 20_000);

    let provider = token(Role::Provider, Some("p-1"));
    let (status, _) = app
        .send("POST", "/commission/process/b-1", Some(&provider), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, first) = app
        .send("POST", "/commission/process/b-1", Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["commissionCents"], 2_000);
    assert_eq!(first["providerEarningCents"], 18_000);
    assert_eq!(first["payoutStatus"], "pending");

    let (_, second) = app
        .send("POST", "/commission/process/b-1", Some(&admin()), None)
        .await;
    assert_eq!(first["id"], second["id"]);

    let (status, body) = app
        .send("POST", "/commission/process/b-404", Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn payout_below_minimum_is_422_and_above_pays_everything() {
    let app = test_app();
    app.add_booking("b-1", "p-1", 5_000);
    app.add_booking("b-2", "p-1", 5_000);
    app.add_booking("b-3", "p-1", 5_000);

    app.send("POST", "/commission/process/b-1", Some(&admin()), None).await;
    app.send("POST", "/commission/process/b-2", Some(&admin()), None).await;

    let (status, body) = app
        .send("POST", "/commission/payout/p-1", Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "insufficient_payout_amount");

    app.send("POST", "/commission/process/b-3", Some(&admin()), None).await;
    let provider = token(Role::Provider, Some("p-1"));
    let (status, pending) = app
        .send("GET", "/commission/pending-payout/p-1", Some(&provider), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending, json!({"providerId": "p-1", "pendingAmount": 13_500}));

    let (status, payout) = app
        .send("POST", "/commission/payout/p-1", Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payout["amountCents"], 13_500);
    assert_eq!(payout["status"], "pending");

    let (_, pending) = app
        .send("GET", "/commission/pending-payout/p-1", Some(&provider), None)
        .await;
    assert_eq!(pending["pendingAmount"], 0);

    let (_, report) = app
        .send("GET", "/commission/provider/p-1", Some(&provider), None)
        .await;
    assert_eq!(report["paidEarningsCents"], 13_500);
    for record in report["records"].as_array().expect("records") {
        assert_eq!(record["payoutId"], payout["id"]);
    }
}

#[tokio::test]
async fn providers_cannot_read_each_other() {
    let app = test_app();
    let provider = token(Role::Provider, Some("p-1"));

    for uri in [
        "/commission/pending-payout/p-2",
        "/commission/provider/p-2",
        "/payouts?providerId=p-2",
    ] {
        let (status, _) = app.send("GET", uri, Some(&provider), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
    }

    let customer = token(Role::Customer, None);
    let (status, _) = app.send("GET", "/payouts", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn customers_cannot_learn_which_payout_ids_exist() {
    let app = test_app();
    let (status, created) = app
        .send(
            "POST",
            "/payouts",
            Some(&admin()),
            Some(json!({"providerId": "p-1", "amountCents": 12_000})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let existing = format!("/payouts/{}", created["id"].as_str().unwrap());

    let customer = token(Role::Customer, None);
    for uri in [existing.as_str(), "/payouts/does-not-exist"] {
        let (status, body) = app.send("GET", uri, Some(&customer), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["code"], "forbidden");
    }

    let owner = token(Role::Provider, Some("p-1"));
    let (status, _) = app.send("GET", &existing, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn schedule_payouts_reports_each_provider() {
    let app = test_app();
    app.add_booking("b-1", "p-1", 20_000);
    app.add_booking("b-2", "p-2", 20_000);
    app.add_booking("b-3", "p-2", 1_000);
    for id in ["b-1", "b-2"] {
        app.send("POST", &format!("/commission/process/{id}"), Some(&admin()), None)
            .await;
    }

    let (status, report) = app
        .send("POST", "/commission/schedule-payouts", Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["eligible"], 2);
    assert_eq!(report["succeeded"].as_array().unwrap().len(), 2);
    assert!(report["failed"].as_array().unwrap().is_empty());

    let (_, metrics) = app.send("GET", "/metrics", None, None).await;
    assert_eq!(metrics["batchRuns"], 1);
    assert_eq!(metrics["payoutsCreated"], 2);
}

#[tokio::test]
async fn analytics_and_dashboard() {
    let app = test_app();
    app.add_booking("b-1", "p-1", 20_000);
    app.add_booking("b-2", "p-2", 10_000);
    for id in ["b-1", "b-2"] {
        app.send("POST", &format!("/commission/process/{id}"), Some(&admin()), None)
            .await;
    }

    let (status, analytics) = app
        .send("GET", "/commission/analytics", Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(analytics["bookings"], 2);
    assert_eq!(analytics["totalCommissionCents"], 2_000 + 2_000);
    assert_eq!(analytics["topProviders"][0]["providerId"], "p-1");

    let (status, _) = app
        .send("GET", "/commission/analytics?dateFrom=bogus", Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, dashboard) = app
        .send("GET", "/commission/dashboard", Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["today"]["bookings"], 2);
    assert_eq!(dashboard["pendingPayouts"]["providers"], 2);
    assert_eq!(dashboard["recent"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn payouts_crud_is_admin_gated() {
    let app = test_app();
    let provider = token(Role::Provider, Some("p-1"));
    let new_payout = json!({"providerId": "p-1", "amountCents": 25_000, "payoutMethod": "pix"});

    let (status, _) = app
        .send("POST", "/payouts", Some(&provider), Some(new_payout.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .send("POST", "/payouts", Some(&admin()), Some(new_payout))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().expect("id").to_string();

    // O dono enxerga o próprio payout
    let (status, fetched) = app
        .send("GET", &format!("/payouts/{id}"), Some(&provider), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["amountCents"], 25_000);

    let (_, listed) = app.send("GET", "/payouts", Some(&provider), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(
            "PUT",
            &format!("/payouts/{id}"),
            Some(&provider),
            Some(json!({"status": "processing"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .send(
            "PUT",
            &format!("/payouts/{id}"),
            Some(&admin()),
            Some(json!({"status": "completed"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "invalid_transition");

    let (status, updated) = app
        .send(
            "PUT",
            &format!("/payouts/{id}"),
            Some(&admin()),
            Some(json!({"status": "processing", "transactionId": "tx-42"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "processing");
    assert_eq!(updated["transactionId"], "tx-42");

    let (status, _) = app
        .send("DELETE", &format!("/payouts/{id}"), Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send("GET", &format!("/payouts/{id}"), Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn failed_payout_returns_earnings_to_pending() {
    let app = test_app();
    app.add_booking("b-1", "p-1", 20_000);
    app.send("POST", "/commission/process/b-1", Some(&admin()), None).await;

    let (_, payout) = app
        .send("POST", "/commission/payout/p-1", Some(&admin()), None)
        .await;
    let id = payout["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send("DELETE", &format!("/payouts/{id}"), Some(&admin()), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, failed) = app
        .send(
            "PUT",
            &format!("/payouts/{id}"),
            Some(&admin()),
            Some(json!({"status": "failed", "failureReason": "account closed"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(failed["failureReason"], "account closed");
    assert!(failed["processedAt"].is_string());

    let (_, pending) = app
        .send("GET", "/commission/pending-payout/p-1", Some(&admin()), None)
        .await;
    assert_eq!(pending["pendingAmount"], 18_000);
}
