use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{get, post},
};
use eyre::{Result, WrapErr, eyre};
use knot_sdk::{SignatureVerifier, StationEvent, VehicleEvent};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::info;

use crate::error::WebhookServerError;

/// An authenticated webhook, handed to the configured sink.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    Station(StationEvent),
    Vehicle(VehicleEvent),
}

#[derive(Clone)]
pub struct AppState {
    pub verifier: SignatureVerifier,
    pub sink: Option<mpsc::Sender<WebhookEvent>>,
}

impl AppState {
    pub fn new(verifier: SignatureVerifier) -> Self {
        Self {
            verifier,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: mpsc::Sender<WebhookEvent>) -> Self {
        self.sink = Some(sink);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/healthcheck",
            get(|| async move { (StatusCode::OK, "Ok").into_response() }),
        )
        .route("/webhooks/stations", post(station_webhook))
        .route("/webhooks/vehicles", post(vehicle_webhook))
        .with_state(state)
}

pub async fn run(host: &str, port: u16, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .wrap_err_with(|| format!("binding {host}:{port}"))?;
    info!(address = %listener.local_addr()?, "listening for webhooks");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

async fn station_webhook(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, WebhookServerError> {
    authenticate(&state, &method, &uri, &headers)?;
    let event: StationEvent = serde_json::from_slice(&body)
        .map_err(|e| WebhookServerError::InvalidPayload(e.to_string()))?;
    info!(event = event.event(), station_id = ?event.station_id(), "station webhook");
    deliver(&state, WebhookEvent::Station(event)).await?;
    Ok(acknowledge())
}

async fn vehicle_webhook(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, WebhookServerError> {
    authenticate(&state, &method, &uri, &headers)?;
    let event: VehicleEvent = serde_json::from_slice(&body)
        .map_err(|e| WebhookServerError::InvalidPayload(e.to_string()))?;
    info!(event = event.event(), vehicle_id = ?event.vehicle_id(), "vehicle webhook");
    deliver(&state, WebhookEvent::Vehicle(event)).await?;
    Ok(acknowledge())
}

fn authenticate(
    state: &AppState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<(), WebhookServerError> {
    let target = uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_else(|| uri.path());
    if state.verifier.verify(headers, method.as_str(), target) {
        Ok(())
    } else {
        Err(WebhookServerError::InvalidSignature)
    }
}

async fn deliver(state: &AppState, event: WebhookEvent) -> Result<(), WebhookServerError> {
    if let Some(sink) = &state.sink {
        sink.send(event)
            .await
            .map_err(|_| eyre!("webhook event receiver was dropped"))?;
    }
    Ok(())
}

fn acknowledge() -> Json<Value> {
    Json(json!({ "code": 0, "message": "ok" }))
}
