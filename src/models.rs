use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::{IntoParams, ToSchema};

// ============ Upstream Models ============

/// Vendor classification of a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    Workday,
    Weekend,
    LegalHoliday,
    /// A normally-off day worked to offset a holiday elsewhere.
    CompensatoryWorkday,
}

impl DayType {
    pub const ALL: [DayType; 4] = [
        DayType::Workday,
        DayType::Weekend,
        DayType::LegalHoliday,
        DayType::CompensatoryWorkday,
    ];

    /// Numeric code used by the upstream API.
    pub fn code(self) -> i64 {
        match self {
            DayType::Workday => 0,
            DayType::Weekend => 1,
            DayType::LegalHoliday => 2,
            DayType::CompensatoryWorkday => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DayType::Workday => "WORKDAY",
            DayType::Weekend => "WEEKEND",
            DayType::LegalHoliday => "LEGAL_HOLIDAY",
            DayType::CompensatoryWorkday => "COMPENSATORY_WORKDAY",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            DayType::Workday => "Regular Workday",
            DayType::Weekend => "Weekend",
            DayType::LegalHoliday => "Legal Holiday",
            DayType::CompensatoryWorkday => "Compensatory Workday",
        }
    }

    pub fn is_working_day(self) -> bool {
        matches!(self, DayType::Workday | DayType::CompensatoryWorkday)
    }

    pub fn is_rest_day(self) -> bool {
        matches!(self, DayType::Weekend | DayType::LegalHoliday)
    }
}

impl TryFrom<i64> for DayType {
    type Error = i64;

    /// Decodes an upstream code; unknown codes are handed back as the error.
    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(DayType::Workday),
            1 => Ok(DayType::Weekend),
            2 => Ok(DayType::LegalHoliday),
            3 => Ok(DayType::CompensatoryWorkday),
            other => Err(other),
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw payload returned by `GET {base}/{date}`.
///
/// Every field is optional so that shape problems surface as explicit
/// validation errors instead of opaque deserialization failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUpstreamResponse {
    /// Vendor status code, 0 means success.
    pub code: Option<i64>,
    /// Vendor error message, usually present when `code != 0`.
    pub message: Option<String>,
    /// `None` when the key is absent, `Some(None)` when it is `null`.
    #[serde(rename = "type", default, deserialize_with = "present")]
    pub day_type: Option<Option<RawDayType>>,
    pub holiday: Option<RawHoliday>,
}

/// Marks a key as present so that an explicit `null` stays distinguishable.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDayType {
    #[serde(rename = "type")]
    pub code: Option<i64>,
    pub name: Option<String>,
    /// 1 = Monday ... 7 = Sunday. Passed through unchecked.
    pub week: Option<serde_json::Number>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHoliday {
    pub holiday: Option<bool>,
    pub name: Option<String>,
    pub wage: Option<i64>,
    /// Holiday a compensatory workday makes up for.
    pub target: Option<String>,
}

impl RawHoliday {
    /// An object with none of the known fields is treated like a missing one.
    pub fn is_empty(&self) -> bool {
        self.holiday.is_none() && self.name.is_none() && self.wage.is_none() && self.target.is_none()
    }
}

// ============ Normalized Models ============

/// Stable internal representation of one upstream lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NormalizedHolidayRecord {
    /// Requested date (YYYY-MM-DD).
    pub date: String,
    pub day_type: DayType,
    pub day_type_code: i64,
    /// Vendor day name, e.g. "周一" or "元旦".
    pub day_name: String,
    /// 1 = Monday ... 7 = Sunday, as reported upstream.
    pub weekday: i64,
    pub is_working_day: bool,
    pub is_rest_day: bool,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    /// Statutory pay multiplier for working on this date (1 or 3).
    pub wage_multiplier: i64,
    pub target_holiday: Option<String>,
}

impl fmt::Display for NormalizedHolidayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_holiday {
            write!(
                f,
                "{}: {} ({})",
                self.date,
                self.holiday_name.as_deref().unwrap_or(""),
                self.day_type.description()
            )
        } else if self.day_type == DayType::CompensatoryWorkday {
            write!(
                f,
                "{}: {} for {}",
                self.date,
                self.day_name,
                self.target_holiday.as_deref().unwrap_or("unknown holiday")
            )
        } else {
            write!(
                f,
                "{}: {} ({})",
                self.date,
                self.day_name,
                self.day_type.description()
            )
        }
    }
}

// ============ API Models ============

/// Simplified day classification exposed by `/today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayCategory {
    Workday,
    Weekend,
    LegalHoliday,
}

/// Response body of `/today` and `/date-info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "date": "2024-01-01",
    "day_type": "legal_holiday",
    "holiday_name": "New Year's Day"
}))]
pub struct DateInfo {
    pub date: String,
    pub day_type: DayCategory,
    /// Only set for legal holidays.
    pub holiday_name: Option<String>,
}

/// Query parameters accepted by `/date-info`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Date in YYYY-MM-DD format, defaults to today.
    pub date: Option<String>,
}

/// Query parameters accepted by `/holiday`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HolidayQuery {
    /// Date in YYYY-MM-DD format.
    pub date: String,
}

/// Query parameters accepted by `/holiday/batch`.
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BatchQuery {
    /// Comma-separated dates in YYYY-MM-DD format.
    pub dates: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchErrorEntry {
    /// Error kind identifier, e.g. "not_found".
    pub error: String,
    pub message: String,
}

/// Response body of `/holiday/batch`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BatchResponse {
    pub success: BTreeMap<String, NormalizedHolidayRecord>,
    pub errors: BTreeMap<String, BatchErrorEntry>,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
