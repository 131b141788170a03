use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::Method;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::models::LightMode;
use super::options::ClientOptions;
use super::transport::SignedTransport;
use super::validation::{self, collection_path, resource_path};
use crate::error::Result;

const VERSION: &str = "v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationSound {
    Beep,
    Success,
    Error,
    Locate,
}

/// Settings pushed by [`StationsClient::configure`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationConfiguration {
    /// Seconds between heartbeats, 30..=3600.
    pub heartbeat_interval: u32,
    /// Seconds a spot stays open after unlock, 5..=120.
    pub unlock_timeout: u32,
    /// Speaker volume in percent.
    pub volume: u8,
}

impl StationConfiguration {
    fn validate(&self) -> Result<()> {
        validation::in_range("heartbeat_interval", self.heartbeat_interval, 30..=3600)?;
        validation::in_range("unlock_timeout", self.unlock_timeout, 5..=120)?;
        validation::in_range("volume", self.volume, 0..=100)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationInformation {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub group: Option<u64>,
    pub enabled: bool,
    pub online: bool,
    pub spots_count: u32,
    #[serde(default)]
    pub firmware_version: Option<String>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotInformation {
    pub spot: u32,
    pub enabled: bool,
    pub occupied: bool,
    #[serde(default)]
    pub vehicle_id: Option<u64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationSummary {
    pub id: u64,
    pub name: String,
    pub online: bool,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Client for the station service.
#[derive(Clone)]
pub struct StationsClient {
    transport: SignedTransport,
}

impl StationsClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let key = Arc::new(options.key_material()?);
        let transport = SignedTransport::new(options.http_client()?, options.station_url()?, key);
        Ok(Self { transport })
    }

    pub(crate) fn from_transport(transport: SignedTransport) -> Self {
        Self { transport }
    }

    pub fn endpoint(&self) -> &Url {
        self.transport.base_url()
    }

    pub async fn reboot(&self, station_id: u64) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        self.transport
            .execute(Method::POST, &resource_path(VERSION, station_id, "reboot"), None)
            .await
    }

    pub async fn ping(&self, station_id: u64) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        self.transport
            .execute(Method::GET, &resource_path(VERSION, station_id, "ping"), None)
            .await
    }

    pub async fn configure(&self, station_id: u64, configuration: &StationConfiguration) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        configuration.validate()?;
        let body = serde_json::to_value(configuration)
            .map_err(crate::error::KnotError::configuration)?;
        self.transport
            .execute(Method::POST, &resource_path(VERSION, station_id, "configure"), Some(body))
            .await
    }

    pub async fn unlock(&self, station_id: u64, spot: u64) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        let spot = validation::id("spot", spot)?;
        self.transport
            .execute(
                Method::POST,
                &resource_path(VERSION, station_id, "unlock"),
                Some(json!({ "spot": spot })),
            )
            .await
    }

    pub async fn sound(&self, station_id: u64, sound: StationSound) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        self.transport
            .execute(
                Method::POST,
                &resource_path(VERSION, station_id, "sound"),
                Some(json!({ "sound": sound })),
            )
            .await
    }

    pub async fn light(&self, station_id: u64, mode: LightMode) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        self.transport
            .execute(
                Method::POST,
                &resource_path(VERSION, station_id, "light"),
                Some(json!({ "mode": mode })),
            )
            .await
    }

    pub async fn set_label(&self, station_id: u64, label: &str) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        let label = validation::label(label)?;
        self.transport
            .execute(
                Method::POST,
                &resource_path(VERSION, station_id, "label"),
                Some(json!({ "label": label })),
            )
            .await
    }

    pub async fn set_group(&self, station_id: u64, group: u64) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        let group = validation::id("group", group)?;
        self.transport
            .execute(
                Method::POST,
                &resource_path(VERSION, station_id, "group"),
                Some(json!({ "group": group })),
            )
            .await
    }

    /// Enables or disables the whole station, or a single spot when `spot`
    /// is given.
    pub async fn enable(&self, station_id: u64, enabled: bool, spot: Option<u64>) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        let mut body = json!({ "enabled": enabled });
        if let Some(spot) = spot {
            body["spot"] = json!(validation::id("spot", spot)?);
        }
        self.transport
            .execute(Method::POST, &resource_path(VERSION, station_id, "enable"), Some(body))
            .await
    }

    pub async fn shutdown(&self, station_id: u64) -> Result<()> {
        let station_id = validation::id("station_id", station_id)?;
        self.transport
            .execute(Method::POST, &resource_path(VERSION, station_id, "shutdown"), None)
            .await
    }

    pub async fn information(&self, station_id: u64) -> Result<StationInformation> {
        let station_id = validation::id("station_id", station_id)?;
        self.transport
            .fetch(&resource_path(VERSION, station_id, "information"))
            .await
    }

    pub async fn spots(&self, station_id: u64) -> Result<Vec<SpotInformation>> {
        let station_id = validation::id("station_id", station_id)?;
        self.transport
            .fetch(&resource_path(VERSION, station_id, "spots"))
            .await
    }

    pub async fn list(&self) -> Result<Vec<StationSummary>> {
        self.transport.fetch(&collection_path(VERSION, "list")).await
    }
}
