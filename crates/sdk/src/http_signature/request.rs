use std::fmt;
use std::sync::Arc;

use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use super::authorization::AuthorizationHeader;
use super::canonical::{API_KEY_HEADER, DATE_HEADER, SIGNED_HEADERS, signing_string};
use super::headers::HeaderSource;
use super::verifier::SignatureVerifier;
use crate::error::{KnotError, Result};
use crate::signing::{HashAlgorithm, KeySigner, SignatureAlgorithm, signer_from_pem};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Key id plus private key, immutable once built.
#[derive(Clone)]
pub struct SigningKeyMaterial {
    key_id: String,
    signer: Arc<dyn KeySigner>,
    hash: HashAlgorithm,
}

impl SigningKeyMaterial {
    pub fn new(key_id: impl Into<String>, signer: Arc<dyn KeySigner>) -> Result<Self> {
        let key_id = key_id.into();
        if key_id.trim().is_empty() {
            return Err(KnotError::Configuration("key id must not be empty".into()));
        }
        if HeaderValue::from_str(&key_id).is_err() || key_id.contains('"') {
            return Err(KnotError::Configuration(format!(
                "key id {key_id:?} cannot be sent in a header"
            )));
        }
        Ok(Self {
            key_id,
            signer,
            hash: HashAlgorithm::default(),
        })
    }

    pub fn from_pem(key_id: impl Into<String>, private_key_pem: &str) -> Result<Self> {
        let signer = signer_from_pem(private_key_pem).map_err(KnotError::configuration)?;
        Self::new(key_id, signer)
    }

    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.signer.algorithm()
    }

    pub fn hash(&self) -> HashAlgorithm {
        self.hash
    }

    /// Verifier holding the matching public key.
    pub fn verifier(&self) -> SignatureVerifier {
        SignatureVerifier::new(self.signer.verifier())
    }
}

impl fmt::Debug for SigningKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeyMaterial")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm())
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}

/// Signs `header_names` of a request and returns the header components.
///
/// `headers` must hold a value for every listed name except
/// `(request-target)`, which is derived from `method` and `path`.
pub fn sign_headers<H, N>(
    method: &str,
    path: &str,
    headers: &H,
    header_names: &[N],
    key: &SigningKeyMaterial,
) -> Result<AuthorizationHeader>
where
    H: HeaderSource + ?Sized,
    N: AsRef<str>,
{
    let signing = signing_string(method, path, header_names, headers)
        .map_err(KnotError::configuration)?;
    let algorithm = key.algorithm();
    let hash = key.hash;
    let digest = hash.digest(signing.as_bytes());
    let signature = key
        .signer
        .sign_digest(&digest, hash)
        .map_err(|e| KnotError::Configuration(format!("signing failed: {e}")))?;

    Ok(AuthorizationHeader {
        key_id: key.key_id.clone(),
        algorithm: Some(algorithm),
        hash: (hash != algorithm.default_hash()).then_some(hash),
        headers: header_names
            .iter()
            .map(|name| name.as_ref().to_ascii_lowercase())
            .collect(),
        signature,
    })
}

/// An outbound call before signing.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Path and query exactly as they appear on the request line.
    pub fn target_path(&self) -> String {
        match self.url.query() {
            Some(query) => format!("{}?{}", self.url.path(), query),
            None => self.url.path().to_string(),
        }
    }
}

/// A request whose signed headers are frozen.
///
/// Fields are read-only so nothing between signing and dispatch can change
/// a covered value.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Vec<u8>,
    payload: Option<Value>,
    authorization: AuthorizationHeader,
}

impl SignedRequest {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Serialized JSON body; empty when the call has none.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// JSON value the body was serialized from.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn authorization(&self) -> &AuthorizationHeader {
        &self.authorization
    }

    pub(crate) fn into_parts(self) -> (Method, Url, HeaderMap, Vec<u8>, Option<Value>) {
        (self.method, self.url, self.headers, self.body, self.payload)
    }
}

/// Stamps the date and content headers onto `descriptor` and signs it with
/// the current time.
pub fn build_signed_request(
    descriptor: RequestDescriptor,
    key: &SigningKeyMaterial,
) -> Result<SignedRequest> {
    build_signed_request_at(descriptor, key, chrono::Utc::now().timestamp_millis())
}

/// [`build_signed_request`] with an explicit `X-Knot-Date` in epoch
/// milliseconds.
pub fn build_signed_request_at(
    descriptor: RequestDescriptor,
    key: &SigningKeyMaterial,
    timestamp_ms: i64,
) -> Result<SignedRequest> {
    let body = match &descriptor.body {
        Some(value) => serde_json::to_vec(value)
            .map_err(|e| KnotError::Configuration(format!("serializing request body: {e}")))?,
        None => Vec::new(),
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(DATE_HEADER),
        HeaderValue::from(timestamp_ms),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    // Byte length, not character count.
    headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
    headers.insert(
        HeaderName::from_static(API_KEY_HEADER),
        HeaderValue::from_str(&key.key_id).map_err(KnotError::configuration)?,
    );

    let path = descriptor.target_path();
    let authorization = sign_headers(
        descriptor.method.as_str(),
        &path,
        &headers,
        &SIGNED_HEADERS,
        key,
    )?;
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&authorization.to_string()).map_err(KnotError::configuration)?,
    );

    debug!(
        method = %descriptor.method,
        path = %path,
        key_id = %key.key_id,
        content_length = body.len(),
        "signed request"
    );

    Ok(SignedRequest {
        method: descriptor.method,
        url: descriptor.url,
        headers,
        body,
        payload: descriptor.body,
        authorization,
    })
}
