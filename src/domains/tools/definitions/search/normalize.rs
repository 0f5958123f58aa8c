//! Search response normalization.
//!
//! `/searchAround` answers in one of two shapes:
//!
//! - direct: `{"providers": [{"name", "latitude", "longitude", ...}]}` or a
//!   bare list of such records
//! - match: `{"matchingWhistles": [{"item": {...whistle...}, "dis", "score"}]}`
//!
//! Both are reduced to a list of [`Provider`]. Field fallbacks are strictly
//! left to right and only skip absent (or `null`) values, so a legitimate `0`
//! coordinate is kept.

use serde_json::{Map, Value};
use thiserror::Error;

use super::model::Provider;
use crate::domains::tools::definitions::common::{first_present, id_string, lenient_f64};

/// A provider record that cannot be reduced to a [`Provider`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NormalizeError {
    #[error("provider record #{index} is not an object")]
    NotAnObject { index: usize },

    #[error("provider record #{index}: field '{field}' has an unexpected type")]
    FieldType { index: usize, field: &'static str },

    #[error("provider record #{index}: coordinates must be [longitude, latitude]")]
    Coordinates { index: usize },
}

/// Reduce a search payload to providers.
///
/// `requested_category` fills in the category of match-shaped records whose
/// whistle carries none.
pub fn normalize_providers(
    payload: &Value,
    requested_category: Option<&str>,
) -> Result<Vec<Provider>, NormalizeError> {
    provider_records(payload)
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let record = record
                .as_object()
                .ok_or(NormalizeError::NotAnObject { index })?;
            match record.get("item") {
                Some(Value::Object(item)) => normalize_match(index, record, item, requested_category),
                None | Some(Value::Null) => normalize_direct(index, record),
                Some(_) => Err(NormalizeError::FieldType { index, field: "item" }),
            }
        })
        .collect()
}

/// The raw record list of a payload.
fn provider_records(payload: &Value) -> &[Value] {
    match payload {
        Value::Object(map) => match map.get("providers") {
            Some(Value::Array(providers)) if !providers.is_empty() => providers.as_slice(),
            _ => match map.get("matchingWhistles") {
                Some(Value::Array(matches)) => matches.as_slice(),
                _ => &[],
            },
        },
        Value::Array(records) => records.as_slice(),
        _ => &[],
    }
}

/// Rating derived from likes and dislikes, on a 0 to 5 scale.
///
/// `None` when the record has neither list; 2.5 when both are empty.
pub fn compute_feedback_rating(item: &Map<String, Value>) -> Option<f64> {
    let likes = item.get("likes").and_then(Value::as_array).map(Vec::len);
    let dislikes = item.get("dislikes").and_then(Value::as_array).map(Vec::len);
    if likes.is_none() && dislikes.is_none() {
        return None;
    }

    let (likes, dislikes) = (likes.unwrap_or(0) as f64, dislikes.unwrap_or(0) as f64);
    let total = likes + dislikes;
    if total == 0.0 {
        return Some(2.5);
    }
    let feedback = (likes - dislikes) / total;
    Some(round_to((feedback + 1.0) * 2.5, 2))
}

fn normalize_match(
    index: usize,
    wrapper: &Map<String, Value>,
    item: &Map<String, Value>,
    requested_category: Option<&str>,
) -> Result<Provider, NormalizeError> {
    let (address, coordinates) = match item.get("location") {
        Some(Value::Object(location)) => (
            text(index, location, &["address"], "location.address")?,
            location.get("coordinates"),
        ),
        Some(Value::String(address)) => (Some(address.clone()), None),
        None | Some(Value::Null) => (None, None),
        Some(_) => return Err(NormalizeError::FieldType { index, field: "location" }),
    };
    let (longitude, latitude) = coordinate_pair(index, coordinates)?;

    let rating = match compute_feedback_rating(item) {
        Some(rating) => Some(rating),
        None => number(index, wrapper, &["score"], "score")?,
    };

    Ok(Provider {
        id: identifier(index, item)?,
        name: text(index, item, &["name", "description"], "name")?.unwrap_or_default(),
        phone: text(index, item, &["phone"], "phone")?,
        address: address.unwrap_or_default(),
        distance: number(index, wrapper, &["dis"], "dis")?.map_or(0.0, |d| round_to(d, 1)),
        latitude,
        longitude,
        category: text(index, item, &["category"], "category")?
            .or_else(|| requested_category.map(String::from)),
        rating,
    })
}

fn normalize_direct(index: usize, record: &Map<String, Value>) -> Result<Provider, NormalizeError> {
    let address = match first_present(record, &["address", "location"]) {
        Some(Value::String(address)) => address.clone(),
        Some(Value::Object(location)) => text(index, location, &["address"], "location.address")?
            .unwrap_or_default(),
        Some(_) => return Err(NormalizeError::FieldType { index, field: "address" }),
        None => String::new(),
    };

    Ok(Provider {
        id: identifier(index, record)?,
        name: text(index, record, &["name", "title"], "name")?.unwrap_or_default(),
        phone: text(index, record, &["phone"], "phone")?,
        address,
        distance: number(index, record, &["distance"], "distance")?.unwrap_or(0.0),
        latitude: number(index, record, &["latitude", "lat"], "latitude")?.unwrap_or(0.0),
        longitude: number(index, record, &["longitude", "lng"], "longitude")?.unwrap_or(0.0),
        category: text(index, record, &["category"], "category")?,
        rating: number(index, record, &["rating", "score"], "rating")?,
    })
}

fn identifier(index: usize, record: &Map<String, Value>) -> Result<String, NormalizeError> {
    match first_present(record, &["id", "_id"]) {
        Some(value) => id_string(value).ok_or(NormalizeError::FieldType { index, field: "id" }),
        None => Ok(String::new()),
    }
}

/// First present string among `keys`; numbers are rendered as text.
fn text(
    index: usize,
    record: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<String>, NormalizeError> {
    match first_present(record, keys) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(NormalizeError::FieldType { index, field }),
    }
}

/// First present number among `keys`; numeric strings are accepted.
fn number(
    index: usize,
    record: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<f64>, NormalizeError> {
    match first_present(record, keys) {
        None => Ok(None),
        Some(value) => lenient_f64(value)
            .map(Some)
            .ok_or(NormalizeError::FieldType { index, field }),
    }
}

/// `[longitude, latitude]` of a GeoJSON point, `(0, 0)` when absent.
fn coordinate_pair(index: usize, coordinates: Option<&Value>) -> Result<(f64, f64), NormalizeError> {
    match coordinates {
        None | Some(Value::Null) => Ok((0.0, 0.0)),
        Some(Value::Array(pair)) if pair.is_empty() => Ok((0.0, 0.0)),
        Some(Value::Array(pair)) if pair.len() >= 2 => {
            match (lenient_f64(&pair[0]), lenient_f64(&pair[1])) {
                (Some(longitude), Some(latitude)) => Ok((longitude, latitude)),
                _ => Err(NormalizeError::Coordinates { index }),
            }
        }
        Some(_) => Err(NormalizeError::Coordinates { index }),
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_direct_shape() {
        let payload = json!({"providers": [{"name": "A", "latitude": 1.0, "longitude": 2.0}]});
        let providers = normalize_providers(&payload, None).unwrap();

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "A");
        assert_eq!(providers[0].latitude, 1.0);
        assert_eq!(providers[0].longitude, 2.0);
        assert_eq!(providers[0].id, "");
        assert_eq!(providers[0].rating, None);
    }

    #[test]
    fn test_match_shape() {
        let payload = json!({
            "matchingWhistles": [
                {"item": {"name": "B", "location": {"coordinates": [2.0, 1.0]}}, "dis": 3.4}
            ]
        });
        let providers = normalize_providers(&payload, None).unwrap();

        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name, "B");
        assert!((providers[0].distance - 3.4).abs() < 1e-9);
        assert_eq!(providers[0].latitude, 1.0);
        assert_eq!(providers[0].longitude, 2.0);
    }

    #[test]
    fn test_match_shape_details() {
        let payload = json!({
            "matchingWhistles": [{
                "item": {
                    "_id": {"$oid": "65f0aa"},
                    "description": "Bike repair",
                    "phone": 9994076214u64,
                    "location": {"address": "12 Main St", "coordinates": [76.961, 10.997]},
                    "likes": ["u1", "u2", "u3"],
                    "dislikes": ["u4"]
                },
                "dis": 1.26,
                "score": 4.9
            }]
        });
        let provider = &normalize_providers(&payload, Some("service")).unwrap()[0];

        assert_eq!(provider.id, "65f0aa");
        assert_eq!(provider.name, "Bike repair");
        assert_eq!(provider.phone.as_deref(), Some("9994076214"));
        assert_eq!(provider.address, "12 Main St");
        assert_eq!(provider.distance, 1.3);
        assert_eq!(provider.category.as_deref(), Some("service"));
        assert_eq!(provider.rating, Some(3.75));
    }

    #[test]
    fn test_match_shape_uses_score_without_feedback() {
        let payload = json!({"matchingWhistles": [{"item": {"category": "food"}, "score": 4.2}]});
        let provider = &normalize_providers(&payload, Some("service")).unwrap()[0];
        assert_eq!(provider.rating, Some(4.2));
        assert_eq!(provider.category.as_deref(), Some("food"));
        assert_eq!((provider.latitude, provider.longitude), (0.0, 0.0));
    }

    #[test]
    fn test_empty_providers_falls_back_to_matches() {
        let payload = json!({
            "providers": [],
            "matchingWhistles": [{"item": {"name": "C"}}]
        });
        let providers = normalize_providers(&payload, None).unwrap();
        assert_eq!(providers[0].name, "C");
    }

    #[test]
    fn test_bare_list_and_other_payloads() {
        let list = json!([{"title": "D", "lat": 5.0, "lng": 6.0}]);
        let providers = normalize_providers(&list, None).unwrap();
        assert_eq!(providers[0].name, "D");
        assert_eq!((providers[0].latitude, providers[0].longitude), (5.0, 6.0));

        assert!(normalize_providers(&json!("nothing"), None).unwrap().is_empty());
        assert!(normalize_providers(&Value::Null, None).unwrap().is_empty());
        assert!(normalize_providers(&json!({"results": []}), None).unwrap().is_empty());
    }

    #[test]
    fn test_zero_coordinate_does_not_fall_back() {
        let payload = json!([{"name": "Equator", "latitude": 0.0, "lat": 45.0, "longitude": 0, "lng": 9}]);
        let provider = &normalize_providers(&payload, None).unwrap()[0];
        assert_eq!((provider.latitude, provider.longitude), (0.0, 0.0));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let payload = json!([{"name": null, "title": "E", "rating": null, "score": "4.5"}]);
        let provider = &normalize_providers(&payload, None).unwrap()[0];
        assert_eq!(provider.name, "E");
        assert_eq!(provider.rating, Some(4.5));
    }

    #[test]
    fn test_direct_address_from_location() {
        let payload = json!([
            {"name": "F", "location": "5th Avenue"},
            {"name": "G", "location": {"address": "Baker St", "coordinates": [0, 0]}}
        ]);
        let providers = normalize_providers(&payload, None).unwrap();
        assert_eq!(providers[0].address, "5th Avenue");
        assert_eq!(providers[1].address, "Baker St");
    }

    #[test]
    fn test_type_mismatch_is_an_error() {
        let payload = json!([{"name": "H", "latitude": "north"}]);
        assert_eq!(
            normalize_providers(&payload, None),
            Err(NormalizeError::FieldType { index: 0, field: "latitude" })
        );

        let payload = json!([{"name": "ok"}, 42]);
        assert_eq!(
            normalize_providers(&payload, None),
            Err(NormalizeError::NotAnObject { index: 1 })
        );

        let payload = json!({"matchingWhistles": [{"item": {"location": {"coordinates": [1.0]}}}]});
        assert_eq!(
            normalize_providers(&payload, None),
            Err(NormalizeError::Coordinates { index: 0 })
        );
    }

    #[test]
    fn test_compute_feedback_rating() {
        let rating = |v: Value| compute_feedback_rating(v.as_object().unwrap());
        assert_eq!(rating(json!({})), None);
        assert_eq!(rating(json!({"likes": [], "dislikes": []})), Some(2.5));
        assert_eq!(rating(json!({"likes": [1, 2]})), Some(5.0));
        assert_eq!(rating(json!({"dislikes": [1]})), Some(0.0));
        assert_eq!(rating(json!({"likes": [1, 2], "dislikes": [3]})), Some(3.33));
    }
}
