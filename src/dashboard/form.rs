//! Form Field Edits
//!
//! Typed edits for the dashboard's input forms. Each variant carries a value
//! of the field's own type, so the type system plays the part of the input
//! element's type attribute. Raw strings from web forms or CLI flags go
//! through [`FieldEdit::parse`].

use thiserror::Error;

use crate::service::{CityRequest, PredictionRequest};

/// Names accepted by [`FieldEdit::parse`]
pub const FIELD_NAMES: &[&str] = &[
    "origin",
    "destination",
    "distance_km",
    "traffic_density",
    "temperature",
    "hour",
    "day_of_week",
    "month",
    "is_holiday",
    "is_weekend",
    "city",
];

/// Fields rendered as `<input type="number">`
const NUMERIC_FIELDS: &[&str] = &[
    "distance_km",
    "traffic_density",
    "temperature",
    "hour",
    "day_of_week",
    "month",
];

/// A single field edit
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Origin(String),
    Destination(String),
    DistanceKm(f64),
    TrafficDensity(f64),
    Temperature(f64),
    Hour(u8),
    DayOfWeek(u8),
    Month(u8),
    IsHoliday(bool),
    IsWeekend(bool),
    City(String),
}

/// Errors from parsing raw field input
#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid number for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Expected name=value, got {0:?}")]
    MalformedAssignment(String),
}

impl FieldEdit {
    /// Parse a raw `name`/`value` pair into a typed edit
    pub fn parse(name: &str, raw: &str) -> Result<Self, FormError> {
        let edit = match name {
            "origin" => Self::Origin(raw.to_string()),
            "destination" => Self::Destination(raw.to_string()),
            "distance_km" => Self::DistanceKm(number("distance_km", raw)?),
            "traffic_density" => Self::TrafficDensity(number("traffic_density", raw)?),
            "temperature" => Self::Temperature(number("temperature", raw)?),
            "hour" => Self::Hour(number("hour", raw)?),
            "day_of_week" => Self::DayOfWeek(number("day_of_week", raw)?),
            "month" => Self::Month(number("month", raw)?),
            "is_holiday" => Self::IsHoliday(flag(raw)),
            "is_weekend" => Self::IsWeekend(flag(raw)),
            "city" => Self::City(raw.to_string()),
            other => return Err(FormError::UnknownField(other.to_string())),
        };
        Ok(edit)
    }

    /// Parse a value as submitted by an HTML form.
    ///
    /// A cleared number input arrives as an empty string; that is no edit and
    /// the field keeps its prior value.
    pub fn from_input(name: &str, raw: &str) -> Result<Option<Self>, FormError> {
        if raw.trim().is_empty() && NUMERIC_FIELDS.contains(&name) {
            return Ok(None);
        }
        Self::parse(name, raw).map(Some)
    }

    /// Parse a `name=value` assignment. Whitespace around both sides is ignored.
    pub fn from_assignment(assignment: &str) -> Result<Option<Self>, FormError> {
        let (name, value) = assignment
            .split_once('=')
            .ok_or_else(|| FormError::MalformedAssignment(assignment.to_string()))?;
        Self::from_input(name.trim(), value.trim())
    }

    /// Field name this edit targets
    pub fn name(&self) -> &'static str {
        match self {
            Self::Origin(_) => "origin",
            Self::Destination(_) => "destination",
            Self::DistanceKm(_) => "distance_km",
            Self::TrafficDensity(_) => "traffic_density",
            Self::Temperature(_) => "temperature",
            Self::Hour(_) => "hour",
            Self::DayOfWeek(_) => "day_of_week",
            Self::Month(_) => "month",
            Self::IsHoliday(_) => "is_holiday",
            Self::IsWeekend(_) => "is_weekend",
            Self::City(_) => "city",
        }
    }

    /// Write the edit into the form records. Only the targeted field changes.
    pub fn apply(self, form: &mut PredictionRequest, city: &mut CityRequest) {
        match self {
            Self::Origin(v) => form.origin = v,
            Self::Destination(v) => form.destination = v,
            Self::DistanceKm(v) => form.distance_km = v,
            Self::TrafficDensity(v) => form.traffic_density = v,
            Self::Temperature(v) => form.temperature = v,
            Self::Hour(v) => form.hour = v,
            Self::DayOfWeek(v) => form.day_of_week = v,
            Self::Month(v) => form.month = v,
            Self::IsHoliday(v) => form.is_holiday = v,
            Self::IsWeekend(v) => form.is_weekend = v,
            Self::City(v) => city.city = v,
        }
    }
}

/// Parse `name=value` assignments into edits, skipping blank numbers
pub fn parse_assignments<S: AsRef<str>>(assignments: &[S]) -> Result<Vec<FieldEdit>, FormError> {
    let mut edits = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        if let Some(edit) = FieldEdit::from_assignment(assignment.as_ref())? {
            edits.push(edit);
        }
    }
    Ok(edits)
}

fn number<T: std::str::FromStr>(field: &'static str, raw: &str) -> Result<T, FormError> {
    raw.trim().parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Checkbox semantics: present and truthy means checked
fn flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "on" | "true" | "1" | "yes"
    )
}
