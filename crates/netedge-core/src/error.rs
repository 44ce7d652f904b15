//! Error types for Network Edge operations.
//!
//! This module provides the error hierarchy shared by Network Edge clients,
//! including normalization of the API's error envelopes and structured error
//! responses.

use crate::update::UpdateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for Network Edge operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Network Edge API could not be reached
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Operation timed out
    #[error("Timeout waiting for Network Edge: {0}")]
    Timeout(String),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Network Edge answered with a non-success status
    #[error(transparent)]
    Api(ApiError),

    /// Response payload could not be converted to its domain representation
    #[error("Failed to decode Network Edge response: {0}")]
    DecodeError(String),

    /// Successful response that lacks required information
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// One or more changes of a composite update failed
    #[error(transparent)]
    Update(UpdateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for Network Edge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Single `(code, message)` pair reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorDetail {
    /// Short error identifier, e.g. `IC-NE-VD-030`
    pub code: String,
    /// Textual description of the error
    pub message: String,
}

/// Normalized Network Edge error response.
///
/// Both error envelopes returned by the API, a single
/// `{errorCode, errorMessage, property}` object and an array of such objects,
/// are folded into this type. A body that matches neither shape is kept as the
/// raw message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// HTTP status code of the response
    pub http_code: u16,
    /// Summary message
    pub message: String,
    /// Individual errors reported by the API
    pub errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorEnvelope {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    property: Option<String>,
}

impl ErrorEnvelope {
    fn is_populated(&self) -> bool {
        self.error_code.is_some() || self.error_message.is_some()
    }

    fn code(&self) -> String {
        self.error_code.clone().unwrap_or_default()
    }

    fn message(&self) -> &str {
        self.error_message.as_deref().unwrap_or_default()
    }

    fn property(&self) -> &str {
        self.property.as_deref().unwrap_or_default()
    }
}

impl ApiError {
    /// Build an API error from a status code and raw response body.
    #[must_use]
    pub fn from_response(http_code: u16, body: &[u8]) -> Self {
        if let Ok(single) = serde_json::from_slice::<ErrorEnvelope>(body) {
            if single.is_populated() {
                return Self::from_single(http_code, &single);
            }
        }
        if let Ok(many) = serde_json::from_slice::<Vec<ErrorEnvelope>>(body) {
            if !many.is_empty() {
                return Self::from_many(http_code, &many);
            }
        }
        Self {
            http_code,
            message: String::from_utf8_lossy(body).into_owned(),
            errors: Vec::new(),
        }
    }

    fn from_single(http_code: u16, envelope: &ErrorEnvelope) -> Self {
        Self {
            http_code,
            message: envelope.message().to_string(),
            errors: vec![ApiErrorDetail {
                code: envelope.code(),
                message: format!(
                    "[Error: Property: {}, {}]",
                    envelope.property(),
                    envelope.message()
                ),
            }],
        }
    }

    fn from_many(http_code: u16, envelopes: &[ErrorEnvelope]) -> Self {
        let summary = envelopes
            .iter()
            .enumerate()
            .map(|(i, e)| format!("[Error {}: Property: {}, {}]", i + 1, e.property(), e.message()))
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            http_code,
            message: format!("Multiple errors occurred: {summary}"),
            errors: envelopes
                .iter()
                .map(|e| ApiErrorDetail {
                    code: e.code(),
                    message: e.message().to_string(),
                })
                .collect(),
        }
    }

    /// Returns true if any reported error carries the given code.
    #[must_use]
    pub fn has_code(&self, code: &str) -> bool {
        self.errors.iter().any(|detail| detail.code == code)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "network edge rest error: httpCode: {}, message: {}",
            self.http_code, self.message
        )
    }
}

impl std::error::Error for ApiError {}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Timeout(_) => "TIMEOUT",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Api(_) => "API_ERROR",
            Self::DecodeError(_) => "DECODE_ERROR",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::Update(_) => "UPDATE_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// HTTP status associated with the error.
    ///
    /// Server responses report their status; every other failure, transport
    /// failures included, reports `0`.
    #[must_use]
    pub fn http_code(&self) -> u16 {
        match self {
            Self::Api(api) => api.http_code,
            _ => 0,
        }
    }

    /// Returns the API error when the server rejected the request.
    #[must_use]
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(api) => Some(api),
            _ => None,
        }
    }

    /// Returns true for connection failures and timeouts.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::Timeout(_) | Self::HttpError(_)
        )
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

impl From<UpdateError> for Error {
    fn from(err: UpdateError) -> Self {
        Self::Update(err)
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::ServiceUnavailable(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::DecodeError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::ServiceUnavailable("test".to_string()).error_code(),
            "SERVICE_UNAVAILABLE"
        );
        assert_eq!(Error::Timeout("test".to_string()).error_code(), "TIMEOUT");
        assert_eq!(
            Error::DecodeError("test".to_string()).error_code(),
            "DECODE_ERROR"
        );
        assert_eq!(
            Error::InvalidResponse("test".to_string()).error_code(),
            "INVALID_RESPONSE"
        );
        assert_eq!(
            Error::Update(UpdateError::new()).error_code(),
            "UPDATE_ERROR"
        );
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
    }

    #[test]
    fn test_single_error_envelope() {
        let body = br#"{
            "errorCode": "IC-NE-VD-030",
            "errorMessage": "Device already removed",
            "property": "uuid"
        }"#;
        let err = ApiError::from_response(400, body);

        assert_eq!(err.http_code, 400);
        assert_eq!(err.message, "Device already removed");
        assert_eq!(
            err.errors,
            vec![ApiErrorDetail {
                code: "IC-NE-VD-030".to_string(),
                message: "[Error: Property: uuid, Device already removed]".to_string(),
            }]
        );
        assert!(err.has_code("IC-NE-VD-030"));
        assert!(!err.has_code("IC-NE-VD-001"));
    }

    #[test]
    fn test_multiple_error_envelope() {
        let body = br#"[
            {"errorCode":"IC-LAYER2-4021","errorMessage":"Invalid speed","property":"speed"},
            {"errorCode":"IC-LAYER2-4022","errorMessage":"Invalid name","property":"name"}
        ]"#;
        let err = ApiError::from_response(422, body);

        assert_eq!(err.http_code, 422);
        assert_eq!(
            err.message,
            "Multiple errors occurred: [Error 1: Property: speed, Invalid speed] \
             [Error 2: Property: name, Invalid name]"
        );
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].code, "IC-LAYER2-4021");
        assert_eq!(err.errors[1].message, "Invalid name");
    }

    #[test]
    fn test_unrecognized_error_body_kept_as_text() {
        let err = ApiError::from_response(502, b"<html>Bad gateway</html>");
        assert_eq!(err.message, "<html>Bad gateway</html>");
        assert!(err.errors.is_empty());

        let err = ApiError::from_response(500, br#"{"unexpected":true}"#);
        assert_eq!(err.message, r#"{"unexpected":true}"#);
        assert!(err.errors.is_empty());
    }

    #[test]
    fn test_http_code() {
        let api = Error::Api(ApiError::from_response(404, b"missing"));
        assert_eq!(api.http_code(), 404);
        assert!(api.as_api_error().is_some());

        let transport = Error::ServiceUnavailable("connection refused".to_string());
        assert_eq!(transport.http_code(), 0);
        assert!(transport.is_transport());
        assert!(transport.as_api_error().is_none());
    }

    #[test]
    fn test_error_display() {
        let err = Error::ServiceUnavailable("api.example.com".to_string());
        assert_eq!(err.to_string(), "Service unavailable: api.example.com");

        let err = Error::Api(ApiError {
            http_code: 409,
            message: "conflict".to_string(),
            errors: Vec::new(),
        });
        assert_eq!(
            err.to_string(),
            "network edge rest error: httpCode: 409, message: conflict"
        );
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let converted: Error = err.into();
        assert!(matches!(converted, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let converted: Error = err.into();
        assert!(matches!(converted, Error::DecodeError(_)));
    }
}
