//! Proximity search tool definition.
//!
//! Looks up visible providers around a location through `/searchAround` and
//! returns them in the canonical [`SearchResult`] shape. The result is always
//! well-formed: validation, transport and normalization failures all produce
//! an empty result carrying an `error` string.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use super::model::{Provider, SearchLocation, SearchResult};
use super::normalize::normalize_providers;
use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, default_limit, ensure_backend_success, lenient_f64, require_positive,
    validate_coordinates, validate_limit,
};
use crate::domains::tools::envelope::structured_result;
use crate::domains::tools::error::{ToolError, ValidationError};

const ENDPOINT: &str = "/searchAround";

fn default_radius() -> f64 {
    2.0
}

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the proximity search tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchParams {
    /// Latitude of the search center (-90 to 90).
    pub latitude: f64,

    /// Longitude of the search center (-180 to 180).
    pub longitude: f64,

    /// Search radius in kilometers (default: 2.0).
    #[serde(default = "default_radius")]
    pub radius: f64,

    /// Free-text keyword such as "mechanic" or "restaurant".
    #[serde(default)]
    pub keyword: Option<String>,

    /// Category filter such as "service" or "business".
    #[serde(default)]
    pub category: Option<String>,

    /// Maximum number of results (1-100, default: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Proximity search tool.
pub struct SearchTool;

impl SearchTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "search";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Search for providers near a location. Optionally filter by keyword and category; radius is in kilometers. Returns the providers with distance, coordinates and rating.";

    /// Execute the search. Never fails: errors are reported in the result.
    #[instrument(skip_all, fields(latitude = params.latitude, longitude = params.longitude, radius = params.radius))]
    pub async fn execute(params: &SearchParams, backend: &dyn BackendApi) -> SearchResult {
        let location = SearchLocation {
            latitude: params.latitude,
            longitude: params.longitude,
        };

        match Self::search(params, backend).await {
            Ok(providers) => {
                info!(
                    query = params.keyword.as_deref().unwrap_or(""),
                    results_count = providers.len(),
                    "Search completed"
                );
                SearchResult::found(providers, params.radius, location)
            }
            Err(e @ ToolError::Validation(_)) => {
                warn!("Search rejected: {}", e);
                SearchResult::failed(params.radius, location, e.to_string())
            }
            Err(e) => {
                error!(kind = e.kind(), "Search failed: {}", e);
                SearchResult::failed(params.radius, location, e.to_string())
            }
        }
    }

    async fn search(params: &SearchParams, backend: &dyn BackendApi) -> Result<Vec<Provider>, ToolError> {
        validate_coordinates(params.latitude, params.longitude)?;
        let radius = require_positive("radius", params.radius)?;
        let limit = validate_limit(params.limit);

        let payload = json!({
            "category": params.category,
            "keyword": params.keyword.as_deref().unwrap_or(""),
            "limit": limit,
            "location": [params.longitude, params.latitude],
            "provider": true,
            "radius": radius,
            "visible": true,
        });
        debug!(payload = %payload, "Sending search request");

        let body = backend
            .request(BackendRequest::post(ENDPOINT).json(payload))
            .await?;
        ensure_backend_success(ENDPOINT, &body)?;

        normalize_providers(&body, params.category.as_deref())
            .map_err(|e| ToolError::unexpected(e.to_string()))
    }

    /// Run the tool and wrap the result as an MCP result.
    pub async fn run(params: SearchParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        let result = Self::execute(&params, backend.as_ref()).await;
        structured_result(&result, result.is_error())
    }

    /// Answer undecodable arguments with an empty result.
    ///
    /// Whatever location and radius could be read are echoed back.
    pub fn rejected(arguments: &serde_json::Value, error: ValidationError) -> CallToolResult {
        let number = |key: &str| arguments.get(key).and_then(lenient_f64);
        let location = SearchLocation {
            latitude: number("latitude").unwrap_or(0.0),
            longitude: number("longitude").unwrap_or(0.0),
        };
        let result = SearchResult::failed(
            number("radius").unwrap_or_else(default_radius),
            location,
            ToolError::from(error).to_string(),
        );
        structured_result(&result, true)
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub async fn http_handler(
        arguments: serde_json::Value,
        backend: Arc<dyn BackendApi>,
    ) -> Result<serde_json::Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, Self::rejected).await)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<SearchParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<SearchResult>().into()),
            icons: None,
            meta: None,
            title: Some("Search nearby providers".into()),
        }
    }

    /// Create a ToolRoute for STDIO transport.
    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, Self::rejected)
    }
}

// ============================================================================
// Tests
// ============================================================================
