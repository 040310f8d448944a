use crate::errors::HolidayApiError;
use crate::models::{DayType, NormalizedHolidayRecord, RawUpstreamResponse};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::StatusCode;
use std::time::Duration;

/// Browser-like headers; the vendor sits behind naive bot filtering.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "application/json, text/plain, */*";
const BROWSER_ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Anything that can resolve a date into a normalized holiday record.
///
/// Handlers only depend on this trait, which lets tests substitute canned
/// responses for the real upstream client.
#[async_trait]
pub trait HolidaySource: Send + Sync {
    async fn fetch_holiday_info(
        &self,
        date: &str,
    ) -> Result<NormalizedHolidayRecord, HolidayApiError>;
}

/// Client for the upstream holiday info API.
///
/// Owns a single pooled `reqwest::Client`; construct it once at startup and
/// call [`HolidayClient::close`] on shutdown.
#[derive(Clone)]
pub struct HolidayClient {
    client: reqwest::Client,
    base_url: String,
}

impl HolidayClient {
    /// Creates a new `HolidayClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Endpoint prefix; the date is appended as the last path segment.
    /// * `timeout` - Total timeout applied to every request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, HolidayApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| {
                HolidayApiError::Upstream(format!("Failed to create holiday API client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Releases the connection pool.
    pub fn close(self) {
        tracing::info!("Closing holiday API client ({})", self.base_url);
        drop(self.client);
    }
}

#[async_trait]
impl HolidaySource for HolidayClient {
    /// Fetches and normalizes the holiday info for `date`.
    ///
    /// The date is forwarded as-is; malformed dates are left to the upstream
    /// API and classified by the status it answers with.
    async fn fetch_holiday_info(
        &self,
        date: &str,
    ) -> Result<NormalizedHolidayRecord, HolidayApiError> {
        let url = format!("{}/{}", self.base_url, date);
        tracing::info!("Fetching holiday info for {}: {}", date, url);

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if let Some(err) = classify_status(status, date) {
            tracing::warn!("Holiday API returned {} for {}", status, date);
            return Err(err);
        }

        let body = response.bytes().await?;
        let record = normalize(date, &body)?;

        tracing::debug!(
            "Holiday info for {}: {} (code {})",
            date,
            record.day_type,
            record.day_type_code
        );
        Ok(record)
    }
}

/// Maps a non-200 status to its error kind. Returns `None` for 200.
pub fn classify_status(status: StatusCode, date: &str) -> Option<HolidayApiError> {
    match status {
        StatusCode::OK => None,
        StatusCode::NOT_FOUND => Some(HolidayApiError::NotFound(format!(
            "Date not found: {}",
            date
        ))),
        StatusCode::TOO_MANY_REQUESTS => Some(HolidayApiError::RateLimit(
            "API rate limit exceeded. Please try again later.".to_string(),
        )),
        s if s.is_server_error() => Some(HolidayApiError::UpstreamServerError(format!(
            "API server error (status {})",
            s.as_u16()
        ))),
        s => Some(HolidayApiError::Upstream(format!(
            "API request failed with status {}",
            s.as_u16()
        ))),
    }
}

/// Normalizes a 200 response body into a [`NormalizedHolidayRecord`].
///
/// # Errors
///
/// Returns [`HolidayApiError::InvalidResponse`] when the body is not JSON,
/// the vendor `code` is non-zero, the `type` object is missing, the day
/// type code is unknown, or `week` is not a whole number. A `type` that is
/// present but `null` is reported as [`HolidayApiError::Upstream`].
pub fn normalize(date: &str, body: &[u8]) -> Result<NormalizedHolidayRecord, HolidayApiError> {
    let raw: RawUpstreamResponse = serde_json::from_slice(body).map_err(|e| {
        HolidayApiError::InvalidResponse(format!("Invalid response from API: {}", e))
    })?;

    if raw.code != Some(0) {
        let code = raw
            .code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let message = raw.message.as_deref().unwrap_or("Unknown error");
        return Err(HolidayApiError::InvalidResponse(format!(
            "API returned error code {}: {}",
            code, message
        )));
    }

    let type_info = match raw.day_type {
        None => {
            return Err(HolidayApiError::InvalidResponse(
                "Missing 'type' field in API response".to_string(),
            ))
        }
        Some(None) => {
            return Err(HolidayApiError::Upstream(
                "Unexpected error while fetching holiday info: 'type' field is null".to_string(),
            ))
        }
        Some(Some(type_info)) => type_info,
    };

    // An absent code reads as a plain workday, like the vendor's own default.
    let code = type_info.code.unwrap_or(0);
    let day_type = DayType::try_from(code).map_err(|code| {
        HolidayApiError::InvalidResponse(format!("Invalid day type code: {}", code))
    })?;

    let weekday = match type_info.week {
        Some(week) => whole_number(&week).ok_or_else(|| {
            HolidayApiError::InvalidResponse(format!("Invalid weekday: {}", week))
        })?,
        None => 1,
    };

    let mut record = NormalizedHolidayRecord {
        date: date.to_string(),
        day_type,
        day_type_code: day_type.code(),
        day_name: type_info.name.unwrap_or_default(),
        weekday,
        is_working_day: day_type.is_working_day(),
        is_rest_day: day_type.is_rest_day(),
        is_holiday: day_type == DayType::LegalHoliday,
        holiday_name: None,
        wage_multiplier: 1,
        target_holiday: None,
    };

    if let Some(holiday) = raw.holiday.filter(|h| !h.is_empty()) {
        record.is_holiday = holiday.holiday.unwrap_or(false);
        record.holiday_name = holiday.name;
        record.wage_multiplier = holiday.wage.unwrap_or(1);
        record.target_holiday = holiday.target;
    }

    Ok(record)
}

/// Accepts integers and integral floats such as `1.0`.
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = HolidayClient::new("https://example.com/api/", Duration::from_secs(10));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "https://example.com/api");
    }

    #[test]
    fn test_normalize_legal_holiday() {
        let payload = body(json!({
            "code": 0,
            "type": {"type": 2, "name": "元旦", "week": 1},
            "holiday": {"holiday": true, "name": "New Year's Day", "wage": 3}
        }));

        let record = normalize("2024-01-01", &payload).unwrap();
        assert_eq!(record.date, "2024-01-01");
        assert_eq!(record.day_type, DayType::LegalHoliday);
        assert_eq!(record.day_type_code, 2);
        assert_eq!(record.day_name, "元旦");
        assert_eq!(record.weekday, 1);
        assert!(record.is_rest_day);
        assert!(!record.is_working_day);
        assert!(record.is_holiday);
        assert_eq!(record.holiday_name.as_deref(), Some("New Year's Day"));
        assert_eq!(record.wage_multiplier, 3);
        assert_eq!(record.target_holiday, None);
    }

    #[test]
    fn test_normalize_plain_workday_defaults() {
        let payload = body(json!({
            "code": 0,
            "type": {"type": 0, "name": "周五", "week": 5},
            "holiday": null
        }));

        let record = normalize("2024-11-15", &payload).unwrap();
        assert_eq!(record.day_type, DayType::Workday);
        assert!(record.is_working_day);
        assert!(!record.is_holiday);
        assert_eq!(record.holiday_name, None);
        assert_eq!(record.wage_multiplier, 1);
    }

    #[test]
    fn test_normalize_compensatory_workday_overrides_holiday_flag() {
        let payload = body(json!({
            "code": 0,
            "type": {"type": 3, "name": "中秋节前补班", "week": 6},
            "holiday": {"holiday": false, "name": "中秋节前补班", "wage": 1, "target": "中秋节"}
        }));

        let record = normalize("2024-09-14", &payload).unwrap();
        assert_eq!(record.day_type, DayType::CompensatoryWorkday);
        assert!(record.is_working_day);
        assert!(!record.is_holiday);
        assert_eq!(record.target_holiday.as_deref(), Some("中秋节"));
    }

    #[test]
    fn test_normalize_legal_holiday_without_holiday_object() {
        let payload = body(json!({"code": 0, "type": {"type": 2, "name": "春节", "week": 6}}));

        let record = normalize("2024-02-10", &payload).unwrap();
        assert!(record.is_holiday);
        assert_eq!(record.holiday_name, None);
    }

    #[test]
    fn test_normalize_empty_holiday_object_is_ignored() {
        let payload = body(json!({"code": 0, "type": {"type": 2}, "holiday": {}}));

        let record = normalize("2024-02-10", &payload).unwrap();
        assert!(record.is_holiday);
    }

    #[test]
    fn test_normalize_missing_type_fields_use_defaults() {
        let payload = body(json!({"code": 0, "type": {}}));

        let record = normalize("2024-11-15", &payload).unwrap();
        assert_eq!(record.day_type, DayType::Workday);
        assert_eq!(record.day_name, "");
        assert_eq!(record.weekday, 1);
    }

    #[test]
    fn test_normalize_rejects_vendor_error_code() {
        let payload = body(json!({"code": -1, "message": "bad date"}));

        let err = normalize("2099-99-99", &payload).unwrap_err();
        assert_eq!(
            err,
            HolidayApiError::InvalidResponse("API returned error code -1: bad date".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_missing_code() {
        let payload = body(json!({"type": {"type": 0}}));

        let err = normalize("2024-01-02", &payload).unwrap_err();
        assert!(err.message().contains("unknown"));
        assert!(err.message().contains("Unknown error"));
    }

    #[test]
    fn test_normalize_rejects_missing_type() {
        let payload = body(json!({"code": 0}));

        let err = normalize("2024-01-02", &payload).unwrap_err();
        assert!(matches!(err, HolidayApiError::InvalidResponse(_)));
        assert!(err.message().contains("Missing 'type'"));
    }

    #[test]
    fn test_normalize_null_type_is_generic_error() {
        let payload = body(json!({"code": 0, "type": null}));

        let err = normalize("2024-01-02", &payload).unwrap_err();
        assert!(matches!(err, HolidayApiError::Upstream(_)));
        assert!(err.message().contains("'type' field is null"));
    }

    #[test]
    fn test_normalize_passes_odd_weekday_through() {
        let payload = body(json!({"code": 0, "type": {"type": 0, "week": -1}}));
        assert_eq!(normalize("2024-01-02", &payload).unwrap().weekday, -1);

        let payload = body(json!({"code": 0, "type": {"type": 0, "week": 2.0}}));
        assert_eq!(normalize("2024-01-02", &payload).unwrap().weekday, 2);

        let payload = body(json!({"code": 0, "type": {"type": 0, "week": 2.5}}));
        let err = normalize("2024-01-02", &payload).unwrap_err();
        assert_eq!(
            err,
            HolidayApiError::InvalidResponse("Invalid weekday: 2.5".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_unknown_day_type() {
        let payload = body(json!({"code": 0, "type": {"type": 7, "name": "?", "week": 1}}));

        let err = normalize("2024-01-02", &payload).unwrap_err();
        assert_eq!(
            err,
            HolidayApiError::InvalidResponse("Invalid day type code: 7".to_string())
        );
    }

    #[test]
    fn test_normalize_rejects_non_json() {
        let err = normalize("2024-01-02", b"<html>blocked</html>").unwrap_err();
        assert!(matches!(err, HolidayApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::OK, "d").is_none());
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "d"),
            Some(HolidayApiError::NotFound(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "d"),
            Some(HolidayApiError::RateLimit(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::SERVICE_UNAVAILABLE, "d"),
            Some(HolidayApiError::UpstreamServerError(_))
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "d"),
            Some(HolidayApiError::Upstream(_))
        ));
        // Any non-200 success is still unexpected.
        assert!(matches!(
            classify_status(StatusCode::NO_CONTENT, "d"),
            Some(HolidayApiError::Upstream(_))
        ));
    }
}
