use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `code` of a successful call.
pub const SUCCESS_CODE: i64 = 0;

/// Body shape of every service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// Decodes a response body. `data` is only decoded on success so that
/// error responses with an unexpected payload still surface their code.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<ApiResponse<T>, String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("response is not JSON: {e}"))?;
    let code = value
        .get("code")
        .and_then(Value::as_i64)
        .ok_or_else(|| "response envelope has no integer `code`".to_string())?;
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let data = match value.get("data") {
        Some(data) if code == SUCCESS_CODE && !data.is_null() => Some(
            T::deserialize(data).map_err(|e| format!("unexpected `data` shape: {e}"))?,
        ),
        _ => None,
    };

    Ok(ApiResponse {
        code,
        message,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: u64,
    }

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn decodes_success_with_data() {
        let envelope: ApiResponse<Item> =
            decode(&bytes(json!({"code": 0, "message": "ok", "data": {"id": 4}}))).unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.data, Some(Item { id: 4 }));
    }

    #[test]
    fn failure_ignores_data() {
        let envelope: ApiResponse<Item> =
            decode(&bytes(json!({"code": 3, "message": "offline", "data": "nope"}))).unwrap();
        assert!(!envelope.is_success());
        assert_eq!(envelope.message, "offline");
        assert!(envelope.data.is_none());
    }

    #[test]
    fn missing_code_is_rejected() {
        let result: Result<ApiResponse<Item>, _> = decode(&bytes(json!({"message": "ok"})));
        assert!(result.unwrap_err().contains("code"));
    }

    #[test]
    fn non_json_is_rejected() {
        let result: Result<ApiResponse<Item>, _> = decode(b"<html>");
        assert!(result.is_err());
    }

    #[test]
    fn wrong_data_shape_is_rejected() {
        let result: Result<ApiResponse<Item>, _> =
            decode(&bytes(json!({"code": 0, "data": {"id": "four"}})));
        assert!(result.is_err());
    }
}
