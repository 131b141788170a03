use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{AlertKind, FaultKind, decode, decode_with_kind, split_tag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotEvent {
    pub station_id: u64,
    pub spot: u32,
    #[serde(default)]
    pub vehicle_id: Option<u64>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationStatus {
    pub station_id: u64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationAlert {
    pub station_id: u64,
    pub kind: AlertKind,
    #[serde(default)]
    pub spot: Option<u32>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationFault {
    pub station_id: u64,
    pub kind: FaultKind,
    #[serde(default)]
    pub spot: Option<u32>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StationEvent {
    SpotLocked(SpotEvent),
    SpotUnlocked(SpotEvent),
    Online(StationStatus),
    Offline(StationStatus),
    Alert(StationAlert),
    Fault(StationFault),
    Unknown { event: String, payload: Value },
}

impl StationEvent {
    pub fn from_value(value: Value) -> Result<Self, String> {
        let (event, object) = split_tag(value)?;
        let decoded = match event.as_str() {
            "spot_locked" => Self::SpotLocked(decode(&event, object)?),
            "spot_unlocked" => Self::SpotUnlocked(decode(&event, object)?),
            "online" => Self::Online(decode(&event, object)?),
            "offline" => Self::Offline(decode(&event, object)?),
            "alert" => Self::Alert(decode(&event, object)?),
            "fault" => Self::Fault(decode(&event, object)?),
            "shake" | "high_temp" => Self::Alert(decode_with_kind(&event, object, event.as_str())?),
            "spot_defect" => Self::Fault(decode_with_kind(&event, object, event.as_str())?),
            _ => Self::Unknown {
                payload: Value::Object(object),
                event,
            },
        };
        Ok(decoded)
    }

    /// Current tag of the event. Retired tags report `alert` or `fault`.
    pub fn event(&self) -> &str {
        match self {
            Self::SpotLocked(_) => "spot_locked",
            Self::SpotUnlocked(_) => "spot_unlocked",
            Self::Online(_) => "online",
            Self::Offline(_) => "offline",
            Self::Alert(_) => "alert",
            Self::Fault(_) => "fault",
            Self::Unknown { event, .. } => event,
        }
    }

    pub fn station_id(&self) -> Option<u64> {
        match self {
            Self::SpotLocked(e) | Self::SpotUnlocked(e) => Some(e.station_id),
            Self::Online(e) | Self::Offline(e) => Some(e.station_id),
            Self::Alert(e) => Some(e.station_id),
            Self::Fault(e) => Some(e.station_id),
            Self::Unknown { payload, .. } => payload.get("stationId").and_then(Value::as_u64),
        }
    }
}

impl<'de> Deserialize<'de> for StationEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}
