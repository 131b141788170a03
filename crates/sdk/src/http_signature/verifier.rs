use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::debug;

use super::authorization::AuthorizationHeader;
use super::canonical::{DATE_HEADER, REQUEST_TARGET, signing_string};
use super::headers::HeaderSource;
use crate::error::KnotError;
use crate::signing::{KeyVerifier, verifier_from_pem};

/// Inbound request as handed over by a webhook handler.
#[derive(Debug)]
pub struct InboundRequest<'a, H: ?Sized> {
    pub headers: &'a H,
    pub http_method: &'a str,
    /// Path and query of the request line.
    pub path: &'a str,
}

/// Checks `Authorization` headers against a counterparty public key.
#[derive(Clone)]
pub struct SignatureVerifier {
    key: Arc<dyn KeyVerifier>,
}

impl SignatureVerifier {
    pub fn new(key: Arc<dyn KeyVerifier>) -> Self {
        Self { key }
    }

    pub fn from_pem(public_key_pem: &str) -> crate::Result<Self> {
        let key = verifier_from_pem(public_key_pem).map_err(KnotError::configuration)?;
        Ok(Self::new(key))
    }

    /// `true` only when the request carries a well-formed signature that
    /// covers the date header and the request target and verifies under
    /// this key. Every other outcome, including malformed input, is `false`.
    pub fn verify<H: HeaderSource + ?Sized>(&self, headers: &H, http_method: &str, path: &str) -> bool {
        match self.check(headers, http_method, path) {
            Ok(()) => true,
            Err(reason) => {
                debug!(method = http_method, path, reason = %format!("{reason:#}"), "signature rejected");
                false
            }
        }
    }

    pub fn verify_request<H: HeaderSource + ?Sized>(&self, request: &InboundRequest<'_, H>) -> bool {
        self.verify(request.headers, request.http_method, request.path)
    }

    fn check<H: HeaderSource + ?Sized>(&self, headers: &H, http_method: &str, path: &str) -> Result<()> {
        let value = headers
            .header_value("authorization")
            .context("missing authorization header")?;
        let authorization = AuthorizationHeader::parse(&value)?;

        // A signature that skips the timestamp or target can be replayed.
        for required in [DATE_HEADER, REQUEST_TARGET] {
            if !authorization.covers(required) {
                bail!("signature does not cover `{required}`");
            }
        }

        let algorithm = authorization.resolved_algorithm();
        if algorithm != self.key.algorithm() {
            bail!(
                "declared algorithm `{algorithm}` does not match a `{}` key",
                self.key.algorithm()
            );
        }
        let hash = authorization.resolved_hash();

        let signing = signing_string(http_method, path, authorization.headers.as_slice(), headers)?;
        self.key
            .verify_digest(&hash.digest(signing.as_bytes()), &authorization.signature, hash)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("algorithm", &self.key.algorithm())
            .finish()
    }
}
