use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Failures raised while talking to the upstream holiday API.
///
/// Every failure of an outbound lookup is classified into exactly one of these
/// kinds before it leaves the client, so handlers never see raw transport errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidayApiError {
    /// The request did not complete within the configured timeout.
    Timeout(String),
    /// Any other transport failure (DNS, TLS, connection reset, ...).
    ConnectionFailure(String),
    /// Upstream answered 404.
    NotFound(String),
    /// Upstream answered 429.
    RateLimit(String),
    /// Upstream answered with a 5xx status.
    UpstreamServerError(String),
    /// Upstream answered 200 but the payload could not be normalized.
    InvalidResponse(String),
    /// Anything else: unexpected statuses and unclassified failures.
    Upstream(String),
}

impl HolidayApiError {
    /// Stable identifier for the error kind, used in batch error entries.
    pub fn kind(&self) -> &'static str {
        match self {
            HolidayApiError::Timeout(_) => "timeout",
            HolidayApiError::ConnectionFailure(_) => "connection_failure",
            HolidayApiError::NotFound(_) => "not_found",
            HolidayApiError::RateLimit(_) => "rate_limit",
            HolidayApiError::UpstreamServerError(_) => "upstream_server_error",
            HolidayApiError::InvalidResponse(_) => "invalid_response",
            HolidayApiError::Upstream(_) => "upstream_error",
        }
    }

    /// The message carried by the error, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            HolidayApiError::Timeout(msg)
            | HolidayApiError::ConnectionFailure(msg)
            | HolidayApiError::NotFound(msg)
            | HolidayApiError::RateLimit(msg)
            | HolidayApiError::UpstreamServerError(msg)
            | HolidayApiError::InvalidResponse(msg)
            | HolidayApiError::Upstream(msg) => msg,
        }
    }
}

impl fmt::Display for HolidayApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for HolidayApiError {}

impl From<reqwest::Error> for HolidayApiError {
    /// Classifies a transport-level `reqwest::Error`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            HolidayApiError::Timeout(format!("Request to holiday API timed out: {}", err))
        } else {
            HolidayApiError::ConnectionFailure(format!(
                "Failed to connect to holiday API: {}",
                err
            ))
        }
    }
}

/// Errors returned by the `/today` and `/date-info` endpoints.
#[derive(Debug, Clone)]
pub enum DateInfoError {
    /// The upstream lookup failed.
    Upstream(HolidayApiError),
    /// The request itself was unusable, e.g. a malformed query string.
    BadRequest(String),
    /// The normalized record did not have the expected shape.
    MalformedRecord(String),
    /// Any other unexpected failure.
    Internal(String),
}

impl DateInfoError {
    /// HTTP status for this error on the date-info surface.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DateInfoError::Upstream(err) => match err {
                HolidayApiError::NotFound(_) => StatusCode::NOT_FOUND,
                HolidayApiError::Timeout(_)
                | HolidayApiError::ConnectionFailure(_)
                | HolidayApiError::UpstreamServerError(_) => StatusCode::BAD_GATEWAY,
                HolidayApiError::RateLimit(_) => StatusCode::SERVICE_UNAVAILABLE,
                HolidayApiError::InvalidResponse(_) | HolidayApiError::Upstream(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            DateInfoError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DateInfoError::MalformedRecord(_) | DateInfoError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing description placed in the `detail` field.
    pub fn detail(&self) -> String {
        match self {
            DateInfoError::Upstream(err) => match err {
                HolidayApiError::NotFound(msg) => format!("Date information not found: {}", msg),
                HolidayApiError::Timeout(_)
                | HolidayApiError::ConnectionFailure(_)
                | HolidayApiError::UpstreamServerError(_) => {
                    "Upstream holiday API unavailable".to_string()
                }
                HolidayApiError::RateLimit(_) => {
                    "Holiday API rate limit exceeded. Please try again later.".to_string()
                }
                HolidayApiError::InvalidResponse(msg) => {
                    format!("Unexpected API response format: {}", msg)
                }
                HolidayApiError::Upstream(msg) => format!("Holiday API error: {}", msg),
            },
            DateInfoError::BadRequest(msg) => msg.clone(),
            DateInfoError::MalformedRecord(msg) => {
                format!("Unexpected API response format: {}", msg)
            }
            DateInfoError::Internal(msg) => format!("An unexpected error occurred: {}", msg),
        }
    }
}

impl fmt::Display for DateInfoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateInfoError::Upstream(err) => write!(f, "Upstream error ({}): {}", err.kind(), err),
            DateInfoError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            DateInfoError::MalformedRecord(msg) => write!(f, "Malformed record: {}", msg),
            DateInfoError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<HolidayApiError> for DateInfoError {
    fn from(err: HolidayApiError) -> Self {
        DateInfoError::Upstream(err)
    }
}

impl IntoResponse for DateInfoError {
    /// Renders `{"detail": "..."}` with the status from [`DateInfoError::status_code`].
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Date info request failed with {}: {}", status, self);
        } else {
            tracing::warn!("Date info request failed with {}: {}", status, self);
        }

        (status, Json(json!({ "detail": self.detail() }))).into_response()
    }
}

/// Errors returned by the `/holiday` endpoints.
///
/// This surface maps the upstream kinds differently from [`DateInfoError`]
/// (for example a rate limit is passed through as 429 here but reported as
/// 503 on `/today`).
#[derive(Debug, Clone)]
pub struct HolidayLookupError {
    pub failure: LookupFailure,
    /// Request path, echoed back in the error body.
    pub path: String,
}

#[derive(Debug, Clone)]
pub enum LookupFailure {
    /// The classified upstream failure.
    Upstream(HolidayApiError),
    /// Missing or malformed request parameters.
    BadRequest(String),
}

impl HolidayLookupError {
    pub fn new(source: HolidayApiError, path: impl Into<String>) -> Self {
        Self {
            failure: LookupFailure::Upstream(source),
            path: path.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            failure: LookupFailure::BadRequest(message.into()),
            path: path.into(),
        }
    }

    /// HTTP status for this error on the holiday lookup surface.
    pub fn status_code(&self) -> StatusCode {
        let source = match &self.failure {
            LookupFailure::Upstream(source) => source,
            LookupFailure::BadRequest(_) => return StatusCode::BAD_REQUEST,
        };
        match source {
            HolidayApiError::NotFound(_) => StatusCode::NOT_FOUND,
            HolidayApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            HolidayApiError::RateLimit(_) => StatusCode::TOO_MANY_REQUESTS,
            HolidayApiError::UpstreamServerError(_) => StatusCode::BAD_GATEWAY,
            HolidayApiError::ConnectionFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
            HolidayApiError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
            HolidayApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message placed in `error.message`.
    pub fn message(&self) -> String {
        let source = match &self.failure {
            LookupFailure::Upstream(source) => source,
            LookupFailure::BadRequest(msg) => return msg.clone(),
        };
        match source {
            HolidayApiError::NotFound(msg) | HolidayApiError::RateLimit(msg) => msg.clone(),
            HolidayApiError::Timeout(msg) => format!("Gateway timeout: {}", msg),
            HolidayApiError::UpstreamServerError(msg) => format!("External API error: {}", msg),
            HolidayApiError::ConnectionFailure(msg) => {
                format!("Service temporarily unavailable: {}", msg)
            }
            HolidayApiError::InvalidResponse(msg) => {
                format!("Invalid response from external API: {}", msg)
            }
            HolidayApiError::Upstream(msg) => format!("Holiday API error: {}", msg),
        }
    }
}

impl fmt::Display for HolidayLookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            LookupFailure::Upstream(source) => write!(f, "{} ({})", source, self.path),
            LookupFailure::BadRequest(msg) => write!(f, "Bad request: {} ({})", msg, self.path),
        }
    }
}

impl IntoResponse for HolidayLookupError {
    /// Renders `{"error": {"status", "message", "path"}}`.
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Holiday lookup failed with {}: {}", status, self);
        } else {
            tracing::warn!("Holiday lookup failed with {}: {}", status, self);
        }

        let body = Json(json!({
            "error": {
                "status": status.as_u16(),
                "message": self.message(),
                "path": self.path,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_kinds() -> Vec<HolidayApiError> {
        vec![
            HolidayApiError::NotFound("x".into()),
            HolidayApiError::Timeout("x".into()),
            HolidayApiError::ConnectionFailure("x".into()),
            HolidayApiError::UpstreamServerError("x".into()),
            HolidayApiError::RateLimit("x".into()),
            HolidayApiError::InvalidResponse("x".into()),
            HolidayApiError::Upstream("x".into()),
        ]
    }

    #[test]
    fn test_date_info_status_table() {
        let statuses: Vec<u16> = all_kinds()
            .into_iter()
            .map(|e| DateInfoError::from(e).status_code().as_u16())
            .collect();
        assert_eq!(statuses, vec![404, 502, 502, 502, 503, 500, 500]);
    }

    #[test]
    fn test_holiday_lookup_status_table() {
        let statuses: Vec<u16> = all_kinds()
            .into_iter()
            .map(|e| HolidayLookupError::new(e, "/holiday/x").status_code().as_u16())
            .collect();
        assert_eq!(statuses, vec![404, 504, 503, 502, 429, 502, 500]);
    }

    #[test]
    fn test_malformed_and_internal_are_500() {
        assert_eq!(
            DateInfoError::MalformedRecord("Missing".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            DateInfoError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_on_both_surfaces() {
        let err = DateInfoError::BadRequest("missing field `date`".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.detail(), "missing field `date`");

        let err = HolidayLookupError::bad_request("missing field `date`", "/holiday");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "missing field `date`");
    }

    #[test]
    fn test_network_details_hide_cause() {
        let err = DateInfoError::from(HolidayApiError::ConnectionFailure(
            "dns error: no such host".into(),
        ));
        assert_eq!(err.detail(), "Upstream holiday API unavailable");
    }

    #[test]
    fn test_kind_identifiers_are_unique() {
        let mut kinds: Vec<&str> = all_kinds().iter().map(|e| e.kind()).collect();
        kinds.sort();
        kinds.dedup();
        assert_eq!(kinds.len(), 7);
    }
}
