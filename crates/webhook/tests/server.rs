use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use knot_sdk::events::AlertKind;
use knot_sdk::http_signature::{RequestDescriptor, SignedRequest, build_signed_request_at};
use knot_sdk::signing::Secp256k1Signer;
use knot_sdk::{SigningKeyMaterial, StationEvent, VehicleEvent};
use knot_webhook::{AppState, WebhookEvent, router};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

fn service_key(seed: &str) -> SigningKeyMaterial {
    SigningKeyMaterial::new("knot-service", Arc::new(Secp256k1Signer::from_seed(seed).unwrap())).unwrap()
}

fn test_state() -> AppState {
    AppState::new(service_key("service").verifier())
}

fn signed(key: &SigningKeyMaterial, path: &str, body: Value) -> SignedRequest {
    let descriptor = RequestDescriptor::new(
        Method::POST,
        format!("http://localhost{path}").parse().unwrap(),
    )
    .with_body(body);
    build_signed_request_at(descriptor, key, 1_700_000_000_000).unwrap()
}

fn into_request(signed: &SignedRequest, path: &str) -> Request<Body> {
    let mut request = Request::builder()
        .method(signed.method().clone())
        .uri(path)
        .body(Body::from(signed.body().to_vec()))
        .unwrap();
    *request.headers_mut() = signed.headers().clone();
    request
}

fn station_online() -> Value {
    json!({"event": "online", "stationId": 42, "date": "2024-03-01T08:30:00Z"})
}

// ── routes ──

#[tokio::test]
async fn healthcheck_returns_200() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthcheck")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"Ok");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn webhooks_only_accept_post() {
    let app = router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/webhooks/stations")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

// ── accepted events ──

#[tokio::test]
async fn signed_station_event_is_acknowledged_and_delivered() {
    let (tx, mut rx) = mpsc::channel(4);
    let app = router(test_state().with_sink(tx));
    let request = signed(&service_key("service"), "/webhooks/stations", station_online());

    let response = app
        .oneshot(into_request(&request, "/webhooks/stations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({"code": 0, "message": "ok"}));

    match rx.try_recv().unwrap() {
        WebhookEvent::Station(StationEvent::Online(status)) => assert_eq!(status.station_id, 42),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn retired_vehicle_event_is_delivered_as_alert() {
    let (tx, mut rx) = mpsc::channel(4);
    let app = router(test_state().with_sink(tx));
    let request = signed(
        &service_key("service"),
        "/webhooks/vehicles",
        json!({"event": "shake", "vehicleId": 901, "date": "2024-03-01T08:30:00Z"}),
    );

    let response = app
        .oneshot(into_request(&request, "/webhooks/vehicles"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    match rx.try_recv().unwrap() {
        WebhookEvent::Vehicle(VehicleEvent::Alert(alert)) => {
            assert_eq!(alert.vehicle_id, 901);
            assert_eq!(alert.kind, AlertKind::Shake);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn unknown_event_is_still_acknowledged() {
    let app = router(test_state());
    let request = signed(
        &service_key("service"),
        "/webhooks/stations",
        json!({"event": "door_opened", "stationId": 42}),
    );

    let response = app
        .oneshot(into_request(&request, "/webhooks/stations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ── rejections ──

#[tokio::test]
async fn unsigned_webhook_returns_401() {
    let app = router(test_state());
    let body = serde_json::to_vec(&station_online()).unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhooks/stations")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn foreign_key_returns_401() {
    let app = router(test_state());
    let request = signed(&service_key("intruder"), "/webhooks/stations", station_online());

    let response = app
        .oneshot(into_request(&request, "/webhooks/stations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn replay_on_another_route_returns_401() {
    let app = router(test_state());
    let request = signed(&service_key("service"), "/webhooks/stations", station_online());

    let response = app
        .oneshot(into_request(&request, "/webhooks/vehicles"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn undecodable_event_returns_400() {
    let app = router(test_state());
    let request = signed(
        &service_key("service"),
        "/webhooks/stations",
        json!({"stationId": 42}),
    );

    let response = app
        .oneshot(into_request(&request, "/webhooks/stations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dropped_sink_returns_500() {
    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let app = router(test_state().with_sink(tx));
    let request = signed(&service_key("service"), "/webhooks/stations", station_online());

    let response = app
        .oneshot(into_request(&request, "/webhooks/stations"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
