use std::fmt;
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::error::{KnotError, Result};
use crate::http_signature::SigningKeyMaterial;
use crate::signing::{HashAlgorithm, SignatureAlgorithm};

pub const DEFAULT_STATION_ENDPOINT: &str = "https://station.knotcity.io";
pub const DEFAULT_VEHICLE_ENDPOINT: &str = "https://vehicle.knotcity.io";

/// Construction options shared by the station and vehicle clients.
#[derive(Clone, Deserialize)]
pub struct ClientOptions {
    pub key_id: String,
    /// PEM text of the private key.
    pub private_key_pem: String,
    #[serde(default)]
    pub station_endpoint: Option<String>,
    #[serde(default)]
    pub vehicle_endpoint: Option<String>,
    /// Must match the private key when set.
    #[serde(default)]
    pub algorithm: Option<SignatureAlgorithm>,
    #[serde(default)]
    pub hash: Option<HashAlgorithm>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ClientOptions {
    pub fn new(key_id: impl Into<String>, private_key_pem: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            private_key_pem: private_key_pem.into(),
            station_endpoint: None,
            vehicle_endpoint: None,
            algorithm: None,
            hash: None,
            timeout_ms: None,
        }
    }

    pub fn with_station_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.station_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_vehicle_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.vehicle_endpoint = Some(endpoint.into());
        self
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = Some(hash);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Reads `KNOT_KEY_ID`, `KNOT_PRIVATE_KEY` or `KNOT_PRIVATE_KEY_FILE`,
    /// and the optional `KNOT_STATION_ENDPOINT`, `KNOT_VEHICLE_ENDPOINT`,
    /// `KNOT_HASH` and `KNOT_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        let key_id = required_env("KNOT_KEY_ID")?;
        let private_key_pem = match std::env::var("KNOT_PRIVATE_KEY") {
            Ok(pem) => pem,
            Err(_) => {
                let path = required_env("KNOT_PRIVATE_KEY_FILE")?;
                std::fs::read_to_string(&path).map_err(|e| {
                    KnotError::Configuration(format!("reading private key from {path}: {e}"))
                })?
            }
        };

        let mut options = Self::new(key_id, private_key_pem);
        options.station_endpoint = std::env::var("KNOT_STATION_ENDPOINT").ok();
        options.vehicle_endpoint = std::env::var("KNOT_VEHICLE_ENDPOINT").ok();
        if let Ok(hash) = std::env::var("KNOT_HASH") {
            options.hash = Some(hash.parse().map_err(KnotError::configuration)?);
        }
        if let Ok(timeout) = std::env::var("KNOT_TIMEOUT_MS") {
            let timeout = timeout.parse().map_err(|e| {
                KnotError::Configuration(format!("KNOT_TIMEOUT_MS is not a number: {e}"))
            })?;
            options.timeout_ms = Some(timeout);
        }
        Ok(options)
    }

    pub(crate) fn key_material(&self) -> Result<SigningKeyMaterial> {
        let key = SigningKeyMaterial::from_pem(self.key_id.clone(), &self.private_key_pem)?;
        if let Some(algorithm) = self.algorithm {
            if algorithm != key.algorithm() {
                return Err(KnotError::Configuration(format!(
                    "algorithm `{algorithm}` does not match the `{}` private key",
                    key.algorithm()
                )));
            }
        }
        Ok(key.with_hash(self.hash.unwrap_or_default()))
    }

    pub(crate) fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = self.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        builder.build().map_err(KnotError::configuration)
    }

    pub(crate) fn station_url(&self) -> Result<Url> {
        parse_endpoint(
            "station_endpoint",
            self.station_endpoint.as_deref().unwrap_or(DEFAULT_STATION_ENDPOINT),
        )
    }

    pub(crate) fn vehicle_url(&self) -> Result<Url> {
        parse_endpoint(
            "vehicle_endpoint",
            self.vehicle_endpoint.as_deref().unwrap_or(DEFAULT_VEHICLE_ENDPOINT),
        )
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("key_id", &self.key_id)
            .field("private_key_pem", &"<redacted>")
            .field("station_endpoint", &self.station_endpoint)
            .field("vehicle_endpoint", &self.vehicle_endpoint)
            .field("algorithm", &self.algorithm)
            .field("hash", &self.hash)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| KnotError::Configuration(format!("{name} is not set")))
}

fn parse_endpoint(name: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| KnotError::Configuration(format!("{name} {raw:?} is not a URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(KnotError::Configuration(format!(
            "{name} {raw:?} must use http or https"
        )));
    }
    if url.host_str().is_none() || url.query().is_some() || url.fragment().is_some() {
        return Err(KnotError::Configuration(format!(
            "{name} {raw:?} must be a bare base URL"
        )));
    }
    Ok(url)
}
