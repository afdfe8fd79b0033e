//! JSON error envelope shared by every slice.
//!
//! Every failure leaves the API as
//! `{"success": false, "error": {"code": "E1001", "message": "...", "details": ...}}`.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use lvai_domain::config::ApiConfig;
use serde::Serialize;
use serde_json::{Value, json};
use std::borrow::Cow;
use std::fmt::Display;
use strum_macros::{AsRefStr, Display as StrumDisplay};
use tracing::error;
use utoipa::ToSchema;

pub type ApiResult<T> = Result<T, ApiError>;

/// Stable machine readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, StrumDisplay, AsRefStr)]
pub enum ErrorCode {
    #[serde(rename = "E1000")]
    #[strum(serialize = "E1000")]
    Internal,
    #[serde(rename = "E1001")]
    #[strum(serialize = "E1001")]
    Validation,
    #[serde(rename = "E1002")]
    #[strum(serialize = "E1002")]
    NotFound,
    #[serde(rename = "E1003")]
    #[strum(serialize = "E1003")]
    PermissionDenied,

    #[serde(rename = "E2000")]
    #[strum(serialize = "E2000")]
    InvalidCredentials,
    #[serde(rename = "E2001")]
    #[strum(serialize = "E2001")]
    TokenExpired,
    #[serde(rename = "E2002")]
    #[strum(serialize = "E2002")]
    TokenInvalid,
    #[serde(rename = "E2003")]
    #[strum(serialize = "E2003")]
    UserNotFound,
    #[serde(rename = "E2004")]
    #[strum(serialize = "E2004")]
    UserInactive,
    #[serde(rename = "E2005")]
    #[strum(serialize = "E2005")]
    EmailExists,
    #[serde(rename = "E2006")]
    #[strum(serialize = "E2006")]
    UsernameExists,

    #[serde(rename = "E3000")]
    #[strum(serialize = "E3000")]
    InsufficientCredits,
    #[serde(rename = "E3001")]
    #[strum(serialize = "E3001")]
    InvalidTransaction,
    #[serde(rename = "E3002")]
    #[strum(serialize = "E3002")]
    PackageNotFound,

    #[serde(rename = "E4000")]
    #[strum(serialize = "E4000")]
    LotteryNotFound,
    #[serde(rename = "E4001")]
    #[strum(serialize = "E4001")]
    InvalidLotteryType,
    #[serde(rename = "E4002")]
    #[strum(serialize = "E4002")]
    DrawNotFound,

    #[serde(rename = "E5000")]
    #[strum(serialize = "E5000")]
    RecommendationFailed,
    #[serde(rename = "E5001")]
    #[strum(serialize = "E5001")]
    AiServiceError,
    #[serde(rename = "E5002")]
    #[strum(serialize = "E5002")]
    StrategyNotFound,
}

/// Body of an error response, as documented in `OpenAPI`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

/// An HTTP error with a status, a code and a client-facing message.
///
/// Internal failures keep their cause out of the body; [`expose_internal_details`]
/// puts it back when `app.debug` is on.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub message: Cow<'static, str>,
    pub details: Option<Value>,
    internal: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self { status, code, message: message.into(), details: None, internal: None }
    }

    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::Validation, message)
    }

    /// 400 with a domain specific code, e.g. duplicate email or unknown lottery.
    pub fn bad_request(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, code, message)
    }

    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::FORBIDDEN, ErrorCode::PermissionDenied, message)
    }

    pub fn not_found(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, code, message)
    }

    #[must_use]
    pub fn insufficient_credits(required: i64, available: i64) -> Self {
        Self::new(StatusCode::PAYMENT_REQUIRED, ErrorCode::InsufficientCredits, "Insufficient credits")
            .with_details(json!({ "required": required, "available": available }))
    }

    /// 500 whose cause is logged and hidden from clients unless debugging.
    pub fn internal(cause: impl Display) -> Self {
        let cause = cause.to_string();
        error!(error = %cause, "Internal error");
        Self {
            internal: Some(cause),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal, "Internal server error")
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    #[must_use]
    pub fn envelope(&self, expose_internal: bool) -> ErrorEnvelope {
        let details = match (&self.internal, expose_internal) {
            (Some(cause), true) => Some(Value::String(cause.clone())),
            _ => self.details.clone(),
        };
        ErrorEnvelope {
            success: false,
            error: ErrorBody { code: self.code, message: self.message.to_string(), details },
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status.as_u16(), self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.envelope(false))).into_response();
        if self.internal.is_some() {
            response.extensions_mut().insert(self);
        }
        response
    }
}

/// Re-renders internal errors with their cause when `app.debug` is enabled.
pub async fn expose_internal_details(
    State(config): State<ApiConfig>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !config.app.debug {
        return response;
    }
    match response.extensions().get::<ApiError>() {
        Some(err) => (err.status, Json(err.envelope(true))).into_response(),
        None => response,
    }
}
