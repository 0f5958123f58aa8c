//! Canonical search result model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A provider found near the search location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub address: String,
    /// Distance from the search location in kilometers.
    pub distance: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Rating on a 0 to 5 scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Center of a search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Result of a proximity search.
///
/// Always well-formed: on failure `providers` is empty, `total_count` is 0
/// and `error` carries the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SearchResult {
    pub providers: Vec<Provider>,
    pub total_count: usize,
    pub search_radius: f64,
    pub search_location: SearchLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResult {
    pub fn found(providers: Vec<Provider>, search_radius: f64, search_location: SearchLocation) -> Self {
        Self {
            total_count: providers.len(),
            providers,
            search_radius,
            search_location,
            error: None,
        }
    }

    pub fn failed(search_radius: f64, search_location: SearchLocation, error: impl Into<String>) -> Self {
        Self {
            providers: Vec::new(),
            total_count: 0,
            search_radius,
            search_location,
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
