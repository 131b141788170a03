use std::sync::Arc;

use http::Method;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::{self, ApiResponse};
use crate::error::{KnotError, Result};
use crate::http_signature::{RequestDescriptor, SigningKeyMaterial, build_signed_request};

/// Signs every call with the client's key and decodes the envelope.
#[derive(Clone)]
pub(crate) struct SignedTransport {
    http: reqwest::Client,
    base_url: Url,
    key: Arc<SigningKeyMaterial>,
}

impl SignedTransport {
    pub(crate) fn new(http: reqwest::Client, base_url: Url, key: Arc<SigningKeyMaterial>) -> Self {
        Self {
            http,
            base_url,
            key,
        }
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        let joined = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&joined).map_err(|e| KnotError::Request {
            url: joined.clone(),
            payload: None,
            reason: format!("invalid request URL: {e}"),
        })
    }

    /// Sends one signed call and returns the decoded envelope, whatever its
    /// code.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse<T>> {
        let url = self.url(path)?;
        let mut descriptor = RequestDescriptor::new(method, url);
        descriptor.body = body;

        let signed = build_signed_request(descriptor, &self.key)?;
        let (method, url, headers, bytes, payload) = signed.into_parts();
        let url_text = url.to_string();
        let request_error = |reason: String| KnotError::Request {
            url: url_text.clone(),
            payload: payload.clone(),
            reason,
        };

        debug!(%method, url = %url_text, "dispatching");
        let response = self
            .http
            .request(method, url)
            .headers(headers)
            .body(bytes)
            .send()
            .await
            .map_err(|e| request_error(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(format!("reading response body: {e}")))?;

        envelope::decode(&body).map_err(|reason| {
            warn!(url = %url_text, %status, %reason, "undecodable response");
            request_error(format!("{reason} (HTTP {status})"))
        })
    }

    /// Call whose success carries no data.
    pub(crate) async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<()> {
        let payload = body.clone();
        let response: ApiResponse<Value> = self.send(method, path, body).await?;
        self.ensure_success(path, payload, &response)?;
        Ok(())
    }

    /// Read call whose success must carry `data`.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response: ApiResponse<T> = self.send(Method::GET, path, None).await?;
        self.ensure_success(path, None, &response)?;
        response.data.ok_or_else(|| KnotError::Request {
            url: self.display_url(path),
            payload: None,
            reason: "successful response carries no `data`".into(),
        })
    }

    fn ensure_success<T>(&self, path: &str, payload: Option<Value>, response: &ApiResponse<T>) -> Result<()> {
        if response.is_success() {
            return Ok(());
        }
        Err(KnotError::Api {
            url: self.display_url(path),
            payload,
            code: response.code,
            message: response.message.clone(),
        })
    }

    fn display_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}
