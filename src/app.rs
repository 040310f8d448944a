use crate::handlers::{self, AppState};
use crate::models::{
    BatchErrorEntry, BatchResponse, DateInfo, DayCategory, DayType, NormalizedHolidayRecord,
};
use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "Holiday Information API", version = "0.1.0"),
    paths(
        handlers::get_today,
        handlers::get_date_info,
        handlers::get_holiday_by_path,
        handlers::get_holiday_by_query,
        handlers::get_holidays_batch
    ),
    components(schemas(
        DateInfo,
        DayCategory,
        DayType,
        NormalizedHolidayRecord,
        BatchResponse,
        BatchErrorEntry
    )),
    tags(
        (name = "date-info", description = "Simplified day classification"),
        (name = "holiday", description = "Normalized upstream holiday records")
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
async fn serve_openapi_spec() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Serves the Swagger UI HTML page pointing at [`serve_openapi_spec`].
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Rust Holiday API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.json",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Routes subject to rate limiting.
///
/// `/holiday/batch` is matched before `/holiday/:date` since static segments
/// take priority.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // API Documentation
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.json", get(serve_openapi_spec))
        .route("/", get(handlers::root))
        // Date info endpoints
        .route("/today", get(handlers::get_today))
        .route("/date-info", get(handlers::get_date_info))
        // Holiday lookup endpoints
        .route("/holiday", get(handlers::get_holiday_by_query))
        .route("/holiday/batch", get(handlers::get_holidays_batch))
        .route("/holiday/:date", get(handlers::get_holiday_by_path))
}

/// Assembles the final app: health check (outside any API layers), the given
/// API routes, a JSON 404 fallback, tracing and CORS.
pub fn build_router(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
