use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{AlertKind, FaultKind, decode, decode_with_kind, split_tag};
use crate::client::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleLockEvent {
    pub vehicle_id: u64,
    /// Set when the vehicle was docked at a station.
    #[serde(default)]
    pub station_id: Option<u64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEvent {
    pub vehicle_id: u64,
    pub position: Position,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryEvent {
    pub vehicle_id: u64,
    pub level: u8,
    #[serde(default)]
    pub charging: bool,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAlert {
    pub vehicle_id: u64,
    pub kind: AlertKind,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFault {
    pub vehicle_id: u64,
    pub kind: FaultKind,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VehicleEvent {
    Unlocked(VehicleLockEvent),
    Locked(VehicleLockEvent),
    Position(PositionEvent),
    Battery(BatteryEvent),
    Alert(VehicleAlert),
    Fault(VehicleFault),
    Unknown { event: String, payload: Value },
}

impl VehicleEvent {
    pub fn from_value(value: Value) -> Result<Self, String> {
        let (event, object) = split_tag(value)?;
        let decoded = match event.as_str() {
            "unlocked" => Self::Unlocked(decode(&event, object)?),
            "locked" => Self::Locked(decode(&event, object)?),
            "position" => Self::Position(decode(&event, object)?),
            "battery" => Self::Battery(decode(&event, object)?),
            "alert" => Self::Alert(decode(&event, object)?),
            "fault" => Self::Fault(decode(&event, object)?),
            "shake" | "high_temp" | "critical_energy" => {
                Self::Alert(decode_with_kind(&event, object, event.as_str())?)
            }
            _ => Self::Unknown {
                payload: Value::Object(object),
                event,
            },
        };
        Ok(decoded)
    }

    /// Current tag of the event. Retired tags report `alert`.
    pub fn event(&self) -> &str {
        match self {
            Self::Unlocked(_) => "unlocked",
            Self::Locked(_) => "locked",
            Self::Position(_) => "position",
            Self::Battery(_) => "battery",
            Self::Alert(_) => "alert",
            Self::Fault(_) => "fault",
            Self::Unknown { event, .. } => event,
        }
    }

    pub fn vehicle_id(&self) -> Option<u64> {
        match self {
            Self::Unlocked(e) | Self::Locked(e) => Some(e.vehicle_id),
            Self::Position(e) => Some(e.vehicle_id),
            Self::Battery(e) => Some(e.vehicle_id),
            Self::Alert(e) => Some(e.vehicle_id),
            Self::Fault(e) => Some(e.vehicle_id),
            Self::Unknown { payload, .. } => payload.get("vehicleId").and_then(Value::as_u64),
        }
    }
}

impl<'de> Deserialize<'de> for VehicleEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}
