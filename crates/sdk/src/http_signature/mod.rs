//! `Signature` authorization headers: building them for outbound calls and
//! checking them on inbound webhooks.
//!
//! The signing string is one `name: value` line per covered header, in the
//! order the header list declares, joined by `\n`:
//!
//! ```text
//! x-knot-date: 1700000000000
//! (request-target): get /v1/42/ping
//! content-type: application/json
//! content-length: 0
//! ```

mod authorization;
mod canonical;
mod headers;
mod request;
mod verifier;

pub use authorization::AuthorizationHeader;
pub use canonical::{
    API_KEY_HEADER, CONTENT_LENGTH_HEADER, CONTENT_TYPE_HEADER, DATE_HEADER, REQUEST_TARGET,
    SIGNED_HEADERS, request_target, signing_string,
};
pub use headers::HeaderSource;
pub use request::{
    JSON_CONTENT_TYPE, RequestDescriptor, SignedRequest, SigningKeyMaterial, build_signed_request,
    build_signed_request_at, sign_headers,
};
pub use verifier::{InboundRequest, SignatureVerifier};
