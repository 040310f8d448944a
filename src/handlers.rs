use crate::date_info::{date_info_from_record, today};
use crate::errors::{DateInfoError, HolidayLookupError};
use crate::holiday_client::HolidaySource;
use crate::models::*;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Resolves dates into normalized holiday records.
    pub source: Arc<dyn HolidaySource>,
}

impl AppState {
    pub fn new(source: Arc<dyn HolidaySource>) -> Self {
        Self { source }
    }
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-holiday-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /
///
/// Describes the available endpoints.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "Holiday Information API",
        "endpoints": {
            "/today": "Get today's date information",
            "/date-info": "Alias for /today, accepts an optional ?date=",
            "/holiday/{date}": "Get holiday information for a specific date",
            "/holiday": "Get holiday information with date as query parameter",
            "/holiday/batch": "Get holiday information for comma-separated dates"
        },
        "example": "/holiday/2024-01-01 or /holiday?date=2024-01-01"
    }))
}

/// GET /today
///
/// Classifies today's date as a workday, weekend or legal holiday.
/// Compensatory workdays are reported as `workday`; `holiday_name` is only
/// set for legal holidays.
#[utoipa::path(
    get,
    path = "/today",
    tag = "date-info",
    responses(
        (status = 200, description = "Successfully retrieved date information", body = DateInfo),
        (status = 404, description = "Date information not found"),
        (status = 500, description = "Internal server error or unexpected API response"),
        (status = 502, description = "Upstream holiday API unavailable"),
        (status = 503, description = "Holiday API rate limit exceeded")
    )
)]
pub async fn get_today(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DateInfo>, DateInfoError> {
    tracing::info!("GET /today");
    resolve_date_info(&state, &today()).await.map(Json)
}

/// GET /date-info
///
/// Alias for `/today`. An optional `date` query parameter looks up another day.
#[utoipa::path(
    get,
    path = "/date-info",
    tag = "date-info",
    params(DateQuery),
    responses(
        (status = 200, description = "Successfully retrieved date information", body = DateInfo),
        (status = 400, description = "Malformed query string"),
        (status = 404, description = "Date information not found"),
        (status = 500, description = "Internal server error or unexpected API response"),
        (status = 502, description = "Upstream holiday API unavailable"),
        (status = 503, description = "Holiday API rate limit exceeded")
    )
)]
pub async fn get_date_info(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Result<Json<DateInfo>, DateInfoError> {
    let Query(params) = query.map_err(|e| DateInfoError::BadRequest(e.body_text()))?;
    let date = params
        .date
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(today);
    tracing::info!("GET /date-info - date: {}", date);

    resolve_date_info(&state, &date).await.map(Json)
}

async fn resolve_date_info(state: &AppState, date: &str) -> Result<DateInfo, DateInfoError> {
    let record = state.source.fetch_holiday_info(date).await?;
    date_info_from_record(date, &record)
}

/// GET /holiday/{date}
///
/// Returns the full normalized record for `date`.
#[utoipa::path(
    get,
    path = "/holiday/{date}",
    tag = "holiday",
    params(("date" = String, Path, description = "Date in YYYY-MM-DD format")),
    responses(
        (status = 200, description = "Normalized holiday record", body = NormalizedHolidayRecord),
        (status = 400, description = "Missing or malformed date"),
        (status = 404, description = "Date not found"),
        (status = 429, description = "Upstream rate limit exceeded"),
        (status = 500, description = "Holiday API error"),
        (status = 502, description = "Upstream server error or invalid upstream response"),
        (status = 503, description = "Upstream unreachable"),
        (status = 504, description = "Upstream timed out")
    )
)]
pub async fn get_holiday_by_path(
    State(state): State<Arc<AppState>>,
    date: Result<Path<String>, PathRejection>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<NormalizedHolidayRecord>, HolidayLookupError> {
    let Path(date) =
        date.map_err(|e| HolidayLookupError::bad_request(e.body_text(), uri.to_string()))?;
    tracing::info!("GET /holiday/{}", date);
    lookup(&state, &date, uri.to_string()).await
}

/// GET /holiday?date=
///
/// Query-parameter variant of [`get_holiday_by_path`] with identical error mapping.
#[utoipa::path(
    get,
    path = "/holiday",
    tag = "holiday",
    params(HolidayQuery),
    responses(
        (status = 200, description = "Normalized holiday record", body = NormalizedHolidayRecord),
        (status = 400, description = "Missing or malformed date"),
        (status = 404, description = "Date not found"),
        (status = 429, description = "Upstream rate limit exceeded"),
        (status = 500, description = "Holiday API error"),
        (status = 502, description = "Upstream server error or invalid upstream response"),
        (status = 503, description = "Upstream unreachable"),
        (status = 504, description = "Upstream timed out")
    )
)]
pub async fn get_holiday_by_query(
    State(state): State<Arc<AppState>>,
    query: Result<Query<HolidayQuery>, QueryRejection>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<NormalizedHolidayRecord>, HolidayLookupError> {
    let Query(params) =
        query.map_err(|e| HolidayLookupError::bad_request(e.body_text(), uri.to_string()))?;
    tracing::info!("GET /holiday - date: {}", params.date);
    lookup(&state, &params.date, uri.to_string()).await
}

async fn lookup(
    state: &AppState,
    date: &str,
    path: String,
) -> Result<Json<NormalizedHolidayRecord>, HolidayLookupError> {
    state
        .source
        .fetch_holiday_info(date)
        .await
        .map(Json)
        .map_err(|e| HolidayLookupError::new(e, path))
}

/// GET /holiday/batch?dates=d1,d2,...
///
/// Looks up each date in order. A failing date is recorded under `errors`
/// and never aborts the remaining lookups.
#[utoipa::path(
    get,
    path = "/holiday/batch",
    tag = "holiday",
    params(BatchQuery),
    responses(
        (status = 200, description = "Per-date results and failures", body = BatchResponse),
        (status = 400, description = "Missing `dates` parameter")
    )
)]
pub async fn get_holidays_batch(
    State(state): State<Arc<AppState>>,
    query: Result<Query<BatchQuery>, QueryRejection>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<BatchResponse>, HolidayLookupError> {
    let Query(params) =
        query.map_err(|e| HolidayLookupError::bad_request(e.body_text(), uri.to_string()))?;
    let dates: Vec<&str> = params.dates.split(',').map(str::trim).collect();
    tracing::info!("GET /holiday/batch - {} dates", dates.len());

    Ok(Json(fetch_batch(state.source.as_ref(), &dates).await))
}

/// Fallback for unmatched routes.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<serde_json::Value>) {
    tracing::warn!("No route for {}", uri);
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

/// Fetches every date sequentially and tallies successes and failures.
pub async fn fetch_batch(source: &dyn HolidaySource, dates: &[&str]) -> BatchResponse {
    let mut response = BatchResponse {
        total: dates.len(),
        ..Default::default()
    };

    for date in dates {
        match source.fetch_holiday_info(date).await {
            Ok(record) => {
                response.errors.remove(*date);
                response.success.insert(date.to_string(), record);
            }
            Err(e) => {
                tracing::warn!("Batch lookup failed for {}: {}", date, e);
                response.success.remove(*date);
                response.errors.insert(
                    date.to_string(),
                    BatchErrorEntry {
                        error: e.kind().to_string(),
                        message: e.to_string(),
                    },
                );
            }
        }
    }

    response.successful = response.success.len();
    response.failed = response.errors.len();
    response
}
