//! Whistle tools: create, update, soft delete and list.

pub mod create;
pub mod delete;
pub mod expiry;
pub mod fields;
pub mod list;
pub mod update;

pub use create::{CreateWhistleParams, CreateWhistleTool};
pub use delete::{DeleteWhistleParams, DeleteWhistleTool};
pub use expiry::{convert_to_iso_format, validate_expiry, validate_expiry_at};
pub use fields::{WhistleUpdate, compose_update, normalize_whistle_record, validate_tags};
pub use list::{ListWhistlesParams, ListWhistlesTool};
pub use update::{UpdateWhistleParams, UpdateWhistleTool};
