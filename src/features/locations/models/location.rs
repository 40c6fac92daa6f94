use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Number, Value};

use crate::core::error::{AppError, Result};
use crate::modules::store::{Collection, Fields};
use crate::shared::constants::SERVER_OWNED_KEYS;

/// Free-text attributes every location carries, defaulting to ""
pub const TEXT_FIELDS: [&str; 14] = [
    "parcel",
    "designer",
    "constructionCompany",
    "landUseZone",
    "aboveGroundFloors",
    "undergroundFloors",
    "solarPower",
    "universalBathroom",
    "universalCommonRoom",
    "universalElevator",
    "landscapeBalcony",
    "rainwaterCollection",
    "frontGreenEnergy",
    "backGreenEnergy",
];

pub const KEY_LATITUDE: &str = "latitude";
pub const KEY_LONGITUDE: &str = "longitude";
pub const KEY_UPLOADED_BY: &str = "uploaded_by";
pub const KEY_APPROVED_BY: &str = "approved_by";
pub const KEY_APPROVED_DATETIME: &str = "approved_datetime";

/// Drop keys the server owns so clients cannot forge ids or timestamps
pub fn strip_server_keys(fields: &mut Fields) {
    for key in SERVER_OWNED_KEYS {
        fields.remove(key);
    }
}

/// Shape a new document for `collection`.
///
/// Text fields default to "", coordinates are required and coerced to numbers,
/// and the stage-specific required fields are enforced. Unknown keys pass through.
pub fn prepare_document(collection: Collection, mut fields: Fields) -> Result<Fields> {
    strip_server_keys(&mut fields);

    for key in TEXT_FIELDS {
        let text = match fields.get(key) {
            Some(value) => coerce_text(key, value)?,
            None => String::new(),
        };
        fields.insert(key.to_string(), Value::String(text));
    }

    for key in [KEY_LATITUDE, KEY_LONGITUDE] {
        let value = fields
            .get(key)
            .ok_or_else(|| AppError::Validation(format!("{} is required", key)))?;
        let number = coerce_coordinate(key, value)?;
        fields.insert(key.to_string(), number);
    }

    require_stage_fields(collection, &mut fields)?;
    Ok(fields)
}

/// Enforce the fields a complete document in `collection` must carry.
///
/// `approved_datetime` is rewritten as RFC 3339.
pub fn require_stage_fields(collection: Collection, fields: &mut Fields) -> Result<()> {
    match collection {
        Collection::Sample => {}
        Collection::Pending => {
            require_text(fields, KEY_UPLOADED_BY)?;
        }
        Collection::Reviewed => {
            require_text(fields, KEY_APPROVED_BY)?;
            normalize_approval_time(fields)?;
        }
    }
    Ok(())
}

/// Shape a partial update: server keys are dropped and only the supplied
/// known fields are coerced. Stage fields of `collection` that are supplied
/// must stay valid.
pub fn prepare_update(collection: Collection, mut partial: Fields) -> Result<Fields> {
    strip_server_keys(&mut partial);

    for key in TEXT_FIELDS {
        if let Some(value) = partial.get(key) {
            let text = coerce_text(key, value)?;
            partial.insert(key.to_string(), Value::String(text));
        }
    }

    for key in [KEY_LATITUDE, KEY_LONGITUDE] {
        if let Some(value) = partial.get(key) {
            let number = coerce_coordinate(key, value)?;
            partial.insert(key.to_string(), number);
        }
    }

    for &key in stage_keys(collection) {
        if !partial.contains_key(key) {
            continue;
        }
        if key == KEY_APPROVED_DATETIME {
            normalize_approval_time(&mut partial)?;
        } else {
            require_text(&partial, key)?;
        }
    }

    Ok(partial)
}

/// Parse a coordinate from free text. Unparseable input yields NaN.
pub fn parse_coordinate_lenient(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// JSON rendition of a coordinate; non-finite values become `null`
pub fn coordinate_value(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Accepts RFC 3339, or a naive `YYYY-MM-DDTHH:MM[:SS]` read as UTC
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn coerce_text(key: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Array(_) | Value::Object(_) => {
            Err(AppError::Validation(format!("{} must be a string", key)))
        }
    }
}

fn coerce_coordinate(key: &str, value: &Value) -> Result<Value> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number
        .filter(|n| n.is_finite())
        .map(coordinate_value)
        .ok_or_else(|| AppError::Validation(format!("{} must be a number", key)))
}

fn stage_keys(collection: Collection) -> &'static [&'static str] {
    match collection {
        Collection::Sample => &[],
        Collection::Pending => &[KEY_UPLOADED_BY],
        Collection::Reviewed => &[KEY_APPROVED_BY, KEY_APPROVED_DATETIME],
    }
}

fn normalize_approval_time(fields: &mut Fields) -> Result<()> {
    let raw = require_text(fields, KEY_APPROVED_DATETIME)?;
    let approved_at = parse_timestamp(&raw).ok_or_else(|| {
        AppError::Validation(format!("{} must be a valid timestamp", KEY_APPROVED_DATETIME))
    })?;
    fields.insert(
        KEY_APPROVED_DATETIME.to_string(),
        Value::String(approved_at.to_rfc3339()),
    );
    Ok(())
}

fn require_text(fields: &Fields, key: &str) -> Result<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::Validation(format!("{} is required", key)))
}
