//! Request payloads and the JSON response envelope.
//!
//! Every response body is the same envelope shape:
//! `{"status": "success" | "error", "message"?, "data"?, "errors"?}` where
//! `errors` is the field → message map of a validation failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vendo_core::{ProductFilters, ValidationErrors};

// =============================================================================
// Response Envelope
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl Envelope {
    pub fn success(data: Value) -> Envelope {
        Envelope {
            status: "success",
            message: None,
            data: Some(data),
            errors: None,
        }
    }

    pub fn success_with_message(message: &str, data: Value) -> Envelope {
        Envelope {
            status: "success",
            message: Some(message.to_string()),
            data: Some(data),
            errors: None,
        }
    }

    pub fn message(message: &str) -> Envelope {
        Envelope {
            status: "success",
            message: Some(message.to_string()),
            data: None,
            errors: None,
        }
    }

    pub fn error(message: &str) -> Envelope {
        Envelope {
            status: "error",
            message: Some(message.to_string()),
            data: None,
            errors: None,
        }
    }

    pub fn validation(errors: ValidationErrors) -> Envelope {
        Envelope {
            status: "error",
            message: Some("the request could not be processed".to_string()),
            data: None,
            errors: Some(errors),
        }
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Body of `POST /v1/users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

/// Body of `POST /v1/auth/tokens`.
#[derive(Debug, Deserialize)]
pub struct AuthTokenRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /v1/products` and `PUT /v1/products/{id}`.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub cost: i64,
    pub amount_available: i64,
}

/// Query string of `GET /v1/products`.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ListQuery {
    /// Missing parameters take the catalog defaults; values are validated
    /// by the engine, not here.
    pub fn filters(&self) -> ProductFilters {
        let defaults = ProductFilters::default();
        ProductFilters {
            page: self.page.unwrap_or(defaults.page),
            page_size: self.page_size.unwrap_or(defaults.page_size),
        }
    }
}
