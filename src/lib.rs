//! Holiday Information API Library
//!
//! A thin HTTP façade over a public holiday lookup API. It fetches the
//! holiday/workday status of a date, normalizes the vendor payload into a
//! stable record, and maps upstream failures to HTTP status codes.
//!
//! # Modules
//!
//! - `app`: Router assembly and OpenAPI document.
//! - `config`: Configuration management.
//! - `date_info`: Day-type mapping for the `/today` surface.
//! - `errors`: Error taxonomy and HTTP error responses.
//! - `handlers`: HTTP request handlers.
//! - `holiday_client`: Upstream client and response normalization.
//! - `models`: Upstream, normalized and API data models.

pub mod app;
pub mod config;
pub mod date_info;
pub mod errors;
pub mod handlers;
pub mod holiday_client;
pub mod models;
