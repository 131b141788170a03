//! Typed clients for the station and vehicle services.
//!
//! Every method validates its arguments first, so a rejected argument never
//! reaches the network.

mod envelope;
mod models;
mod options;
mod stations;
mod transport;
mod validation;
mod vehicles;

use std::sync::Arc;

pub use envelope::{ApiResponse, SUCCESS_CODE};
pub use models::{LightMode, Position};
pub use options::{ClientOptions, DEFAULT_STATION_ENDPOINT, DEFAULT_VEHICLE_ENDPOINT};
pub use stations::{
    SpotInformation, StationConfiguration, StationInformation, StationSound, StationSummary,
    StationsClient,
};
pub use validation::MAX_LABEL_LENGTH;
pub use vehicles::{
    BatteryInformation, SPEED_LIMIT_RANGE, SpeedMode, VehicleInformation, VehicleSound,
    VehicleSummary, VehiclesClient,
};

use crate::error::Result;
use transport::SignedTransport;

/// Both service clients behind one key and one connection pool.
#[derive(Clone)]
pub struct KnotClient {
    pub stations: StationsClient,
    pub vehicles: VehiclesClient,
}

impl KnotClient {
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let key = Arc::new(options.key_material()?);
        let http = options.http_client()?;
        Ok(Self {
            stations: StationsClient::from_transport(SignedTransport::new(
                http.clone(),
                options.station_url()?,
                key.clone(),
            )),
            vehicles: VehiclesClient::from_transport(SignedTransport::new(
                http,
                options.vehicle_url()?,
                key,
            )),
        })
    }
}
