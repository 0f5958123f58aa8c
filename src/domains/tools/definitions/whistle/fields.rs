//! Whistle field validation, update composition and record normalization.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::expiry::{NEVER, validate_expiry};
use crate::domains::tools::definitions::common::{
    id_string, require_positive, take_first, validate_coordinates,
};
use crate::domains::tools::error::{MAX_TAGS, ValidationError};

/// Trim tags, drop blank ones and enforce the tag limit.
pub fn validate_tags(tags: &[String]) -> Result<Vec<String>, ValidationError> {
    let tags: Vec<String> = tags
        .iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect();
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags { count: tags.len() });
    }
    Ok(tags)
}

/// Check a whistle id before it is spliced into an endpoint path.
pub fn validate_whistle_id(raw: &str) -> Result<String, ValidationError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingField("whistle_id"));
    }
    if id.chars().any(|c| matches!(c, '/' | '?' | '#') || c.is_whitespace()) {
        return Err(ValidationError::invalid(
            "whistle_id",
            "must not contain '/', '?', '#' or whitespace",
        ));
    }
    Ok(id.to_string())
}

/// Fields of a whistle that an update may change. Absent fields are left as
/// they are on the backend.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct WhistleUpdate {
    /// New description.
    #[serde(default)]
    pub description: Option<String>,

    /// Replacement tag list (at most 20 tags).
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// Alert radius in kilometers.
    #[serde(default)]
    pub alert_radius: Option<f64>,

    /// New expiry: "never" or a date such as 2030-01-31 or 31/01/2030.
    #[serde(default)]
    pub expiry: Option<String>,

    /// Whether the whistle offers (true) or requests (false) a service.
    #[serde(default)]
    pub provider: Option<bool>,

    /// Whether the whistle is active.
    #[serde(default)]
    pub active: Option<bool>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub sub_category: Option<String>,

    /// New position as `[longitude, latitude]`.
    #[serde(default)]
    pub location: Option<Vec<f64>>,
}

/// Compose the backend update payload from the provided fields.
///
/// Keys are renamed to the backend's camelCase names and the location becomes
/// a GeoJSON point. An update without any field is rejected.
pub fn compose_update(update: &WhistleUpdate) -> Result<Map<String, Value>, ValidationError> {
    let mut payload = Map::new();

    if let Some(description) = &update.description {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::invalid("description", "must not be blank"));
        }
        payload.insert("description".into(), json!(description));
    }
    if let Some(tags) = &update.tags {
        payload.insert("tags".into(), json!(validate_tags(tags)?));
    }
    if let Some(radius) = update.alert_radius {
        payload.insert("alertRadius".into(), json!(require_positive("alert_radius", radius)?));
    }
    if let Some(expiry) = &update.expiry {
        payload.insert("expiry".into(), json!(validate_expiry(expiry)?));
    }
    if let Some(provider) = update.provider {
        payload.insert("provider".into(), json!(provider));
    }
    if let Some(active) = update.active {
        payload.insert("active".into(), json!(active));
    }
    if let Some(category) = &update.category {
        payload.insert("category".into(), json!(category));
    }
    if let Some(sub_category) = &update.sub_category {
        payload.insert("subCategory".into(), json!(sub_category));
    }
    if let Some(location) = &update.location {
        payload.insert("location".into(), geo_point(location)?);
    }

    if payload.is_empty() {
        return Err(ValidationError::NoUpdatesProvided);
    }
    Ok(payload)
}

/// `[longitude, latitude]` as a GeoJSON point.
fn geo_point(location: &[f64]) -> Result<Value, ValidationError> {
    let [longitude, latitude] = location else {
        return Err(ValidationError::invalid(
            "location",
            format!("expected [longitude, latitude], got {} values", location.len()),
        ));
    };
    validate_coordinates(*latitude, *longitude)?;
    Ok(json!({ "type": "Point", "coordinates": [longitude, latitude] }))
}

/// Normalize a backend whistle record for clients.
///
/// `_id` becomes `id` and a missing or null `expiry` becomes `"never"`.
/// Anything that is not an object is returned unchanged.
pub fn normalize_whistle_record(record: Value) -> Value {
    let Value::Object(mut fields) = record else {
        return record;
    };

    if let Some(raw) = take_first(&mut fields, &["_id", "id"]) {
        let id = id_string(&raw).map(Value::String).unwrap_or(raw);
        fields.insert("id".into(), id);
    }
    if fields.get("expiry").is_none_or(Value::is_null) {
        fields.insert("expiry".into(), Value::String(NEVER.to_string()));
    }

    Value::Object(fields)
}
