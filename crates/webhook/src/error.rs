use axum::http::StatusCode;
use axum_core::response::{IntoResponse as AxumCoreIntoResponse, Response};
use eyre::Report;

#[derive(Debug, thiserror::Error)]
pub enum WebhookServerError {
    #[error(transparent)]
    Unexpected(#[from] Report),
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

/// Trait implementation to convert this error into an axum http response
impl AxumCoreIntoResponse for WebhookServerError {
    fn into_response(self) -> Response {
        match self {
            unauthorized @ WebhookServerError::InvalidSignature => {
                (StatusCode::UNAUTHORIZED, unauthorized.to_string()).into_response()
            }
            bad_request @ WebhookServerError::InvalidPayload(_) => {
                (StatusCode::BAD_REQUEST, bad_request.to_string()).into_response()
            }
            WebhookServerError::Unexpected(report) => {
                tracing::error!(error = %format!("{report:#}"), "webhook handling failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something wrong happened.",
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_signature_returns_401() {
        let response = WebhookServerError::InvalidSignature.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn invalid_payload_returns_400() {
        let error = WebhookServerError::InvalidPayload("missing `event` field".into());
        assert_eq!(
            error.to_string(),
            "Invalid webhook payload: missing `event` field"
        );
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unexpected_returns_500() {
        let error = WebhookServerError::from(eyre::eyre!("receiver dropped"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
