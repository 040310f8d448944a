//! Collapses normalized holiday records into the public `DateInfo` shape.

use crate::errors::DateInfoError;
use crate::models::{DateInfo, DayCategory, NormalizedHolidayRecord};
use serde_json::Value;

/// Current local calendar date as `YYYY-MM-DD`.
pub fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Maps an upstream day type code to the public category.
///
/// Unknown codes fall back to [`DayCategory::Workday`] rather than failing,
/// for compatibility with existing callers of `/today`.
pub fn category_for_code(code: i64) -> DayCategory {
    match code {
        0 | 3 => DayCategory::Workday,
        1 => DayCategory::Weekend,
        2 => DayCategory::LegalHoliday,
        other => {
            tracing::warn!("Unknown day_type_code {}, treating as workday", other);
            DayCategory::Workday
        }
    }
}

/// Builds a [`DateInfo`] from a normalized record.
///
/// The record is validated again through its serialized form, independently
/// of the checks the client already ran.
pub fn date_info_from_record(
    date: &str,
    record: &NormalizedHolidayRecord,
) -> Result<DateInfo, DateInfoError> {
    let value = serde_json::to_value(record).map_err(|e| {
        DateInfoError::Internal(format!("Failed to serialize holiday record: {}", e))
    })?;
    map_date_info(date, &value)
}

/// Validates a serialized normalized record and maps it to a [`DateInfo`].
///
/// # Errors
///
/// Returns [`DateInfoError::MalformedRecord`] if the value is not an object,
/// lacks `day_type_code`, or `day_type_code` is not an integer.
pub fn map_date_info(date: &str, record: &Value) -> Result<DateInfo, DateInfoError> {
    let fields = record.as_object().ok_or_else(|| {
        DateInfoError::MalformedRecord("Response is not an object".to_string())
    })?;

    let code_value = fields.get("day_type_code").ok_or_else(|| {
        DateInfoError::MalformedRecord("Missing 'day_type_code' field".to_string())
    })?;

    let code = code_value.as_i64().ok_or_else(|| {
        DateInfoError::MalformedRecord(format!(
            "'day_type_code' is not an integer (got {})",
            json_type_name(code_value)
        ))
    })?;

    let day_type = category_for_code(code);
    let holiday_name = match day_type {
        DayCategory::LegalHoliday => fields
            .get("holiday_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        DayCategory::Workday | DayCategory::Weekend => None,
    };

    Ok(DateInfo {
        date: date.to_string(),
        day_type,
        holiday_name,
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
