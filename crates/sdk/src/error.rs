use serde_json::Value;

pub type Result<T> = std::result::Result<T, KnotError>;

#[derive(Debug, thiserror::Error)]
pub enum KnotError {
    /// Unusable client options or key material, including signing failures.
    #[error("Invalid client configuration: {0}")]
    Configuration(String),
    /// Argument rejected before any request was built.
    #[error("Invalid argument `{name}`: {reason}")]
    Validation { name: &'static str, reason: String },
    /// Transport failure or a response that is not a Knot envelope.
    #[error("Request to {url} failed: {reason}")]
    Request {
        url: String,
        payload: Option<Value>,
        reason: String,
    },
    /// Well-formed envelope carrying a non-zero code.
    #[error("Request to {url} was rejected with code {code}: {message}")]
    Api {
        url: String,
        payload: Option<Value>,
        code: i64,
        message: String,
    },
}

impl KnotError {
    pub(crate) fn configuration(error: impl std::fmt::Display) -> Self {
        Self::Configuration(error.to_string())
    }

    pub(crate) fn validation(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            name,
            reason: reason.into(),
        }
    }

    /// URL of the failed call, for request and API errors.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Request { url, .. } | Self::Api { url, .. } => Some(url),
            _ => None,
        }
    }

    /// JSON body that was sent with the failed call, if any.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Request { payload, .. } | Self::Api { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
