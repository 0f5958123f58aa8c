//! User profile and settings tools.

pub mod profile;
pub mod settings;

pub use profile::{GetUserProfileParams, GetUserProfileTool, UserProfile};
pub use settings::{
    ToggleSoundParams, ToggleSoundTool, ToggleTrackingParams, ToggleTrackingTool,
    ToggleVisibilityParams, ToggleVisibilityTool, UserSetting,
};
