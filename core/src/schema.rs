//! Validators for inbound payloads.
//!
//! The remote API is neither versioned nor schema-enforced, so every body is
//! checked here before anything downstream touches it. Shape problems become
//! `ResponseShapeError` instead of surfacing deep inside rendering.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::errors::{ClientError, ClientResult};

const DEFAULT_PLACE_NAME: &str = "Place";

/// One day of an itinerary plan
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub day: u32,
    pub summary: String,
    pub places: Vec<PlaceEntry>,
}

/// A place as sent by the server; coordinates are left raw until a marker needs them
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceEntry {
    pub name: String,
    pub lat: Value,
    pub lng: Value,
}

impl PlaceEntry {
    /// Usable `(lat, lng)`, or `None` when either side is missing, non-numeric or out of range.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = coordinate(&self.lat).filter(|v| (-90.0..=90.0).contains(v))?;
        let lng = coordinate(&self.lng).filter(|v| (-180.0..=180.0).contains(v))?;
        Some((lat, lng))
    }
}

/// A validated itinerary response
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryPlan {
    pub destination: Option<String>,
    pub days: Vec<DayPlan>,
    /// The `plan` array untouched, for saving back to the server
    pub raw_plan: Value,
}

/// Entry of `/api/itinerary/my`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItinerary {
    #[serde(default)]
    pub id: Option<i64>,
    pub destination: String,
    #[serde(default)]
    pub days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub app: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// Extracts the bearer token from a login response.
pub fn parse_token(body: &Value) -> Option<String> {
    body.get("access_token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn parse_plan(body: Value) -> ClientResult<ItineraryPlan> {
    let mut object = into_object(body, "itinerary response")?;

    let destination = object
        .get("destination")
        .and_then(Value::as_str)
        .map(str::to_string);

    let raw_plan = object
        .remove("plan")
        .ok_or_else(|| ClientError::shape("itinerary response has no `plan` field"))?;
    let entries = raw_plan
        .as_array()
        .ok_or_else(|| ClientError::shape("itinerary `plan` is not a list"))?;

    let days = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_day(index, entry))
        .collect::<ClientResult<Vec<_>>>()?;

    Ok(ItineraryPlan {
        destination,
        days,
        raw_plan,
    })
}

fn parse_day(index: usize, entry: &Value) -> ClientResult<DayPlan> {
    let object = entry
        .as_object()
        .ok_or_else(|| ClientError::shape(format!("plan entry {index} is not an object")))?;

    let day = object
        .get("day")
        .and_then(day_number)
        .ok_or_else(|| ClientError::shape(format!("plan entry {index} has no day number")))?;

    let summary = match object.get("summary") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(_) => {
            return Err(ClientError::shape(format!(
                "plan entry {index} has a non-text summary"
            )))
        }
    };

    let places = match object.get("places") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().filter_map(parse_place).collect(),
        Some(_) => {
            return Err(ClientError::shape(format!(
                "plan entry {index} has a non-list `places`"
            )))
        }
    };

    Ok(DayPlan {
        day,
        summary,
        places,
    })
}

fn parse_place(value: &Value) -> Option<PlaceEntry> {
    let Some(object) = value.as_object() else {
        warn!("Ignoring place entry that is not an object");
        return None;
    };
    let name = object
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(DEFAULT_PLACE_NAME)
        .to_string();
    Some(PlaceEntry {
        name,
        lat: object.get("lat").cloned().unwrap_or(Value::Null),
        lng: object.get("lng").cloned().unwrap_or(Value::Null),
    })
}

fn day_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Recommendation text, or `None` when the field is missing, not text, or blank.
pub fn parse_recommendation(body: &Value) -> Option<String> {
    body.get("recommendation")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

pub fn parse_saved(body: Value) -> ClientResult<Vec<SavedItinerary>> {
    if !body.is_array() {
        return Err(ClientError::shape("saved itineraries response is not a list"));
    }
    serde_json::from_value(body)
        .map_err(|e| ClientError::shape(format!("saved itinerary entry is malformed: {e}")))
}

pub fn parse_health(body: Value) -> ClientResult<HealthStatus> {
    serde_json::from_value(body)
        .map_err(|e| ClientError::shape(format!("health response is malformed: {e}")))
}

/// Place names from a provider response: either a bare list or `{results: [...]}`.
pub fn parse_place_names(body: &Value) -> ClientResult<Vec<String>> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(object) => object
            .get("results")
            .and_then(Value::as_array)
            .ok_or_else(|| ClientError::shape("places response has no `results` list"))?,
        _ => return Err(ClientError::shape("places response is not a list")),
    };
    Ok(items
        .iter()
        .filter_map(|item| item.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// Best human-readable detail from an error body (FastAPI uses `{"detail": ...}`).
pub fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());
    match detail {
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
        None => body.trim().to_string(),
    }
}

fn into_object(body: Value, what: &str) -> ClientResult<Map<String, Value>> {
    match body {
        Value::Object(object) => Ok(object),
        _ => Err(ClientError::shape(format!("{what} is not an object"))),
    }
}
