//! Shared API response envelope
//!
//! Every JSON response from the SmartFarm API uses the same envelope so
//! clients can handle success and failure uniformly:
//!
//! ```json
//! {"success": true, "message": "Success", "data": {...}, "error": null}
//! {"success": false, "message": "...", "data": null,
//!  "error": {"code": 400, "message": "...", "details": {...}}}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error payload carried inside the envelope on failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code mirrored into the body
    pub code: u16,
    /// Human-readable error message
    pub message: String,
    /// Field-keyed validation details (empty object when not applicable)
    pub details: Value,
}

/// Standardized API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

impl<T: Serialize> ApiEnvelope<T> {
    /// Successful response with data
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl ApiEnvelope<Value> {
    /// Failed response with a status code and optional field details
    pub fn error(code: u16, message: impl Into<String>, details: Option<Value>) -> Self {
        let message = message.into();
        Self {
            success: false,
            message: message.clone(),
            data: None,
            error: Some(ErrorBody {
                code,
                message,
                details: details.unwrap_or_else(|| Value::Object(Default::default())),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope() {
        let envelope = ApiEnvelope::success(json!({"guid": "abc"}), "Created");

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Created");
        assert_eq!(json["data"]["guid"], "abc");
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_error_envelope_with_details() {
        let envelope = ApiEnvelope::error(
            400,
            "Region parameter is required",
            Some(json!({"region": ["This field is required."]})),
        );

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], 400);
        assert_eq!(json["error"]["details"]["region"][0], "This field is required.");
    }

    #[test]
    fn test_error_envelope_empty_details() {
        let envelope = ApiEnvelope::error(500, "An error occurred", None);
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json["error"]["details"].is_object());
    }
}
