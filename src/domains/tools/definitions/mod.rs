//! Tool definitions module.
//!
//! One file per tool, grouped by backend area. The pure validators and
//! normalizers the tools rely on live next to them:
//!
//! - `auth/phone.rs`: phone number and country code normalization
//! - `search/normalize.rs`: search response reshaping
//! - `whistle/expiry.rs`, `whistle/fields.rs`: expiry parsing, tag limits,
//!   update composition

pub mod auth;
pub mod common;
pub mod search;
pub mod user;
pub mod whistle;

pub use auth::{ResendOtpTool, SignInTool, VerifyOtpTool};
pub use search::SearchTool;
pub use user::{GetUserProfileTool, ToggleSoundTool, ToggleTrackingTool, ToggleVisibilityTool};
pub use whistle::{CreateWhistleTool, DeleteWhistleTool, ListWhistlesTool, UpdateWhistleTool};
