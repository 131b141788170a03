//! Webhook payloads pushed by the station and vehicle services.
//!
//! Both event families are keyed by their `event` field. Tags this crate
//! does not know decode into an `Unknown` variant that keeps the raw payload.
//! The retired `shake`, `high_temp`, `critical_energy` and `spot_defect`
//! events decode into `Alert`/`Fault` with the matching kind.

mod station;
mod vehicle;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use station::{SpotEvent, StationAlert, StationEvent, StationFault, StationStatus};
pub use vehicle::{BatteryEvent, PositionEvent, VehicleAlert, VehicleEvent, VehicleFault, VehicleLockEvent};

pub(crate) const EVENT_FIELD: &str = "event";
const KIND_FIELD: &str = "kind";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertKind {
    Shake,
    HighTemperature,
    CriticalEnergy,
    Other(String),
}

impl AlertKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Shake => "shake",
            Self::HighTemperature => "high_temp",
            Self::CriticalEnergy => "critical_energy",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for AlertKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "shake" => Self::Shake,
            "high_temp" => Self::HighTemperature,
            "critical_energy" => Self::CriticalEnergy,
            _ => Self::Other(kind),
        }
    }
}

impl From<AlertKind> for String {
    fn from(kind: AlertKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FaultKind {
    SpotDefect,
    Other(String),
}

impl FaultKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SpotDefect => "spot_defect",
            Self::Other(kind) => kind,
        }
    }
}

impl From<String> for FaultKind {
    fn from(kind: String) -> Self {
        match kind.as_str() {
            "spot_defect" => Self::SpotDefect,
            _ => Self::Other(kind),
        }
    }
}

impl From<FaultKind> for String {
    fn from(kind: FaultKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a payload into its `event` tag and the object itself.
pub(crate) fn split_tag(value: Value) -> Result<(String, Map<String, Value>), String> {
    let Value::Object(object) = value else {
        return Err("event payload must be a JSON object".into());
    };
    match object.get(EVENT_FIELD) {
        Some(Value::String(event)) => Ok((event.clone(), object)),
        Some(_) => Err("`event` must be a string".into()),
        None => Err("missing `event` field".into()),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(event: &str, object: Map<String, Value>) -> Result<T, String> {
    serde_json::from_value(Value::Object(object)).map_err(|e| format!("invalid `{event}` event: {e}"))
}

/// Decodes a retired event by stamping the kind its tag implied.
pub(crate) fn decode_with_kind<T: DeserializeOwned>(
    event: &str,
    mut object: Map<String, Value>,
    kind: impl Into<String>,
) -> Result<T, String> {
    object.insert(KIND_FIELD.into(), Value::String(kind.into()));
    decode(event, object)
}
