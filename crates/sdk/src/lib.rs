//! Client SDK for the Knot station and vehicle services.
//!
//! Outbound calls are signed with an HTTP `Signature` authorization header;
//! [`SignatureVerifier`] checks the same scheme on inbound webhooks.

pub mod client;
pub mod error;
pub mod events;
pub mod http_signature;
pub mod signing;

pub use client::{ClientOptions, KnotClient, StationsClient, VehiclesClient};
pub use error::{KnotError, Result};
pub use events::{StationEvent, VehicleEvent};
pub use http_signature::{
    AuthorizationHeader, SignatureVerifier, SignedRequest, SigningKeyMaterial, build_signed_request,
};
pub use reqwest::Url;
pub use signing::{HashAlgorithm, SignatureAlgorithm};
