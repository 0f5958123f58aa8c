//! User profile tool definition.

use std::sync::Arc;

use rmcp::{
    handler::server::tool::{ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument, warn};

use crate::core::backend::{BackendApi, BackendRequest};
use crate::domains::tools::definitions::common::{
    backend_route, ensure_backend_success, id_string, reject_envelope, require_access_token,
    take_first,
};
use crate::domains::tools::definitions::whistle::normalize_whistle_record;
use crate::domains::tools::envelope::Envelope;
use crate::domains::tools::error::ToolError;

const ENDPOINT: &str = "/user";

/// A user record as returned to clients.
///
/// The backend's `_id` becomes `id` and its `Whistles` list becomes
/// `whistles`, with every whistle normalized the same way. Other fields are
/// passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default)]
    pub whistles: Vec<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Build a profile from the backend `user` object.
    pub fn from_backend(user: Value) -> Result<Self, ToolError> {
        let Value::Object(mut fields) = user else {
            return Err(ToolError::unexpected("user record is not an object"));
        };

        let id = match take_first(&mut fields, &["_id", "id"]) {
            Some(raw) => Some(
                id_string(&raw).ok_or_else(|| ToolError::unexpected("user id has an unexpected type"))?,
            ),
            None => None,
        };

        let whistles = match take_first(&mut fields, &["Whistles", "whistles"]) {
            None => Vec::new(),
            Some(Value::Array(whistles)) => whistles.into_iter().map(normalize_whistle_record).collect(),
            Some(_) => return Err(ToolError::unexpected("user whistles are not a list")),
        };

        Ok(Self {
            id,
            whistles,
            extra: fields,
        })
    }
}

/// Parameters for the profile tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetUserProfileParams {
    /// Access token from verify_otp.
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Profile tool - returns the signed-in user and their whistles.
pub struct GetUserProfileTool;

impl GetUserProfileTool {
    pub const NAME: &'static str = "get_user_profile";

    pub const DESCRIPTION: &'static str =
        "Get the signed-in user's profile, including settings and the list of their whistles.";

    #[instrument(skip_all)]
    pub async fn execute(params: &GetUserProfileParams, backend: &dyn BackendApi) -> Envelope {
        match Self::fetch(params, backend).await {
            Ok(profile) => match serde_json::to_value(&profile) {
                Ok(data) => Envelope::success(data),
                Err(e) => Envelope::failure(&ToolError::unexpected(e.to_string())),
            },
            Err(e @ ToolError::AuthenticationRequired(_)) => {
                warn!("Profile request rejected: {}", e);
                Envelope::failure(&e)
            }
            Err(e) => {
                error!(kind = e.kind(), "User profile retrieval failed: {}", e);
                Envelope::failure(&e)
            }
        }
    }

    async fn fetch(params: &GetUserProfileParams, backend: &dyn BackendApi) -> Result<UserProfile, ToolError> {
        let token = require_access_token(params.access_token.as_deref())?;

        let body = backend
            .request(BackendRequest::get(ENDPOINT).authorization(token))
            .await?;
        ensure_backend_success(ENDPOINT, &body)?;
        debug!(response = %body, "Profile response");

        let user = match body {
            Value::Object(mut map) => map.remove("user").filter(|u| !u.is_null()),
            _ => None,
        }
        .ok_or_else(|| ToolError::not_found("User not found"))?;

        let profile = UserProfile::from_backend(user)?;
        info!(user_id = ?profile.id, whistles = profile.whistles.len(), "User profile retrieved");
        Ok(profile)
    }

    pub async fn run(params: GetUserProfileParams, backend: Arc<dyn BackendApi>) -> CallToolResult {
        Self::execute(&params, backend.as_ref()).await.into_result()
    }

    #[cfg(feature = "http")]
    pub async fn http_handler(arguments: Value, backend: Arc<dyn BackendApi>) -> Result<Value, String> {
        use crate::domains::tools::definitions::common::{decode_and_run, result_to_value};

        result_to_value(&decode_and_run(arguments, backend, Self::run, reject_envelope).await)
    }

    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<GetUserProfileParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: Some("User profile".into()),
        }
    }

    pub fn create_route<S>(backend: Arc<dyn BackendApi>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        backend_route(Self::to_tool(), backend, Self::run, reject_envelope)
    }
}
