use chrono::NaiveDateTime;
use diesel::{Identifiable, Insertable, Queryable};
use rocket::FromForm;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::error::ApiError;
use crate::schema::entries;

pub const MISSING_FIELDS: &str = "Date and riderName required";
pub const BAD_TRIP_COUNT: &str = "tripCount must be a whole number";
pub const BAD_INCIDENTS: &str = "incidents must be text";

/// A stored rider entry, serialized with the camelCase field names the
/// rider and admin pages use.
#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[diesel(table_name = entries)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Entry {
    pub id: i32,
    pub date: String,
    pub rider_name: String,
    pub trip_count: i32,
    pub incidents: String,
    #[ts(type = "string")]
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = entries)]
pub struct NewEntry {
    pub date: String,
    pub rider_name: String,
    pub trip_count: i32,
    pub incidents: String,
    pub created_at: NaiveDateTime,
}

/// Body of `POST /api/entries`.
///
/// Fields are kept as raw JSON so that a missing, empty or oddly typed
/// `date` or `riderName` is reported as a validation failure rather than a
/// parse error.
#[derive(Debug, Default, Clone, Deserialize, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EntrySubmission {
    #[serde(default)]
    #[ts(type = "string | null")]
    pub date: Option<Value>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub rider_name: Option<Value>,
    /// Number or numeric string; form inputs usually send strings.
    #[serde(default)]
    #[ts(type = "number | string | null")]
    pub trip_count: Option<Value>,
    #[serde(default)]
    #[ts(type = "string | null")]
    pub incidents: Option<Value>,
}

/// Url-encoded body of `POST /api/entries`. Every value arrives as text.
#[derive(Debug, Default, FromForm)]
pub struct EntryForm {
    pub date: Option<String>,
    #[field(name = "riderName")]
    pub rider_name: Option<String>,
    #[field(name = "tripCount")]
    pub trip_count: Option<String>,
    pub incidents: Option<String>,
}

impl From<EntryForm> for EntrySubmission {
    fn from(form: EntryForm) -> Self {
        EntrySubmission {
            date: form.date.map(Value::String),
            rider_name: form.rider_name.map(Value::String),
            trip_count: form.trip_count.map(Value::String),
            incidents: form.incidents.map(Value::String),
        }
    }
}

impl EntrySubmission {
    /// Checks the required fields and fills in defaults, producing the row
    /// to insert. `created_at` is stamped with `now`.
    pub fn validate(self, now: NaiveDateTime) -> Result<NewEntry, ApiError> {
        let date = self.date.as_ref().and_then(text_value);
        let rider_name = self.rider_name.as_ref().and_then(text_value);
        let (date, rider_name) = match (date, rider_name) {
            (Some(date), Some(rider_name)) => (date, rider_name),
            _ => return Err(ApiError::Validation(MISSING_FIELDS.to_string())),
        };

        Ok(NewEntry {
            date,
            rider_name,
            trip_count: parse_trip_count(self.trip_count.as_ref())?,
            incidents: parse_incidents(self.incidents.as_ref())?,
            created_at: now,
        })
    }
}

/// Non-empty strings and numbers as text. Everything else counts as absent.
fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_incidents(value: Option<&Value>) -> Result<String, ApiError> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(_) => Err(ApiError::Validation(BAD_INCIDENTS.to_string())),
    }
}

/// Falsy values (absent, null, false, 0, "") count as zero.
fn parse_trip_count(value: Option<&Value>) -> Result<i32, ApiError> {
    let invalid = || ApiError::Validation(BAD_TRIP_COUNT.to_string());
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(0),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).map_err(|_| invalid())
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 => {
                        Ok(f as i32)
                    }
                    _ => Err(invalid()),
                }
            }
        }
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Ok(0)
            } else {
                s.parse::<i32>().map_err(|_| invalid())
            }
        }
        Some(_) => Err(invalid()),
    }
}

/// Conjunctive filter for listing entries. `None` means "no constraint".
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    /// Inclusive lower bound on `date`.
    pub start_date: Option<String>,
    /// Inclusive upper bound on `date`.
    pub end_date: Option<String>,
    /// Substring that must appear somewhere in `riderName`.
    pub rider: Option<String>,
}

impl EntryFilter {
    /// Builds a filter, treating empty strings as absent.
    pub fn new(
        start_date: Option<String>,
        end_date: Option<String>,
        rider: Option<String>,
    ) -> Self {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        EntryFilter {
            start_date: present(start_date),
            end_date: present(end_date),
            rider: present(rider),
        }
    }
}

/// Response to a successful submission.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct EntryCreated {
    pub id: i32,
    pub message: &'static str,
}
