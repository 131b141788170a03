use std::ops::RangeInclusive;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::Method;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::models::{LightMode, Position};
use super::options::ClientOptions;
use super::transport::SignedTransport;
use super::validation::{self, collection_path, resource_path};
use crate::error::Result;

const VERSION: &str = "v1";

/// Accepted `max_speed` values in km/h.
pub const SPEED_LIMIT_RANGE: RangeInclusive<u8> = 6..=25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleSound {
    Beep,
    Alarm,
    Locate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedMode {
    Eco,
    Normal,
    Sport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInformation {
    pub id: u64,
    pub serial: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub group: Option<u64>,
    pub enabled: bool,
    pub locked: bool,
    pub online: bool,
    #[serde(default)]
    pub speed_mode: Option<SpeedMode>,
    #[serde(default)]
    pub max_speed: Option<u8>,
    #[serde(default)]
    pub battery_level: Option<u8>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryInformation {
    /// Charge in percent.
    pub level: u8,
    pub charging: bool,
    /// Whether the battery is latched into the vehicle.
    pub locked: bool,
    #[serde(default)]
    pub voltage: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub id: u64,
    pub serial: String,
    #[serde(default)]
    pub label: Option<String>,
    pub online: bool,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Client for the vehicle service.
#[derive(Clone)]
pub struct VehiclesClient {
    transport: SignedTransport,
}

impl VehiclesClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let key = Arc::new(options.key_material()?);
        let transport = SignedTransport::new(options.http_client()?, options.vehicle_url()?, key);
        Ok(Self { transport })
    }

    pub(crate) fn from_transport(transport: SignedTransport) -> Self {
        Self { transport }
    }

    pub fn endpoint(&self) -> &Url {
        self.transport.base_url()
    }

    async fn command(&self, vehicle_id: u64, action: &str, body: Option<serde_json::Value>) -> Result<()> {
        let vehicle_id = validation::id("vehicle_id", vehicle_id)?;
        self.transport
            .execute(Method::POST, &resource_path(VERSION, vehicle_id, action), body)
            .await
    }

    pub async fn reboot(&self, vehicle_id: u64) -> Result<()> {
        self.command(vehicle_id, "reboot", None).await
    }

    pub async fn ping(&self, vehicle_id: u64) -> Result<()> {
        let vehicle_id = validation::id("vehicle_id", vehicle_id)?;
        self.transport
            .execute(Method::GET, &resource_path(VERSION, vehicle_id, "ping"), None)
            .await
    }

    pub async fn unlock(&self, vehicle_id: u64) -> Result<()> {
        self.command(vehicle_id, "unlock", None).await
    }

    pub async fn lock(&self, vehicle_id: u64) -> Result<()> {
        self.command(vehicle_id, "lock", None).await
    }

    pub async fn sound(&self, vehicle_id: u64, sound: VehicleSound) -> Result<()> {
        self.command(vehicle_id, "sound", Some(json!({ "sound": sound })))
            .await
    }

    pub async fn light(&self, vehicle_id: u64, mode: LightMode) -> Result<()> {
        self.command(vehicle_id, "light", Some(json!({ "mode": mode })))
            .await
    }

    /// `max_speed` is in km/h and must fall within [`SPEED_LIMIT_RANGE`].
    pub async fn speed_mode(&self, vehicle_id: u64, mode: SpeedMode, max_speed: u8) -> Result<()> {
        let max_speed = validation::in_range("max_speed", max_speed, SPEED_LIMIT_RANGE)?;
        self.command(
            vehicle_id,
            "speed-mode",
            Some(json!({ "mode": mode, "maxSpeed": max_speed })),
        )
        .await
    }

    pub async fn set_label(&self, vehicle_id: u64, label: &str) -> Result<()> {
        let label = validation::label(label)?;
        self.command(vehicle_id, "label", Some(json!({ "label": label })))
            .await
    }

    pub async fn set_group(&self, vehicle_id: u64, group: u64) -> Result<()> {
        let group = validation::id("group", group)?;
        self.command(vehicle_id, "group", Some(json!({ "group": group })))
            .await
    }

    pub async fn enable(&self, vehicle_id: u64, enabled: bool) -> Result<()> {
        self.command(vehicle_id, "enable", Some(json!({ "enabled": enabled })))
            .await
    }

    pub async fn shutdown(&self, vehicle_id: u64) -> Result<()> {
        self.command(vehicle_id, "shutdown", None).await
    }

    /// Releases the battery latch.
    pub async fn unlock_battery(&self, vehicle_id: u64) -> Result<()> {
        self.command(vehicle_id, "battery/unlock", None).await
    }

    pub async fn battery(&self, vehicle_id: u64) -> Result<BatteryInformation> {
        let vehicle_id = validation::id("vehicle_id", vehicle_id)?;
        self.transport
            .fetch(&resource_path(VERSION, vehicle_id, "battery"))
            .await
    }

    pub async fn information(&self, vehicle_id: u64) -> Result<VehicleInformation> {
        let vehicle_id = validation::id("vehicle_id", vehicle_id)?;
        self.transport
            .fetch(&resource_path(VERSION, vehicle_id, "information"))
            .await
    }

    pub async fn list(&self) -> Result<Vec<VehicleSummary>> {
        self.transport.fetch(&collection_path(VERSION, "list")).await
    }
}
