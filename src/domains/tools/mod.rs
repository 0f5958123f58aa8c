//! Tools domain module.
//!
//! Every tool validates its input locally, issues one backend request and
//! returns a result envelope. Failures never escape a tool: they become an
//! error envelope with a readable message.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `router.rs` - Dynamic ToolRouter builder for STDIO transport
//! - `registry.rs` - Central tool registry and HTTP dispatch
//! - `envelope.rs` - Success/error result envelopes
//! - `error.rs` - Tool error taxonomy
//! - `redact.rs` - Masking of secrets in logged arguments
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/<area>/`
//! 2. Define params, execute(), run(), http_handler(), to_tool() and create_route()
//! 3. Export in `definitions/mod.rs`
//! 4. Add route in `router.rs` using `with_route()`
//! 5. Register in `registry.rs` for HTTP support

pub mod definitions;
pub mod envelope;
pub mod error;
pub mod redact;
mod registry;
pub mod router;

pub use envelope::{Envelope, StatusEnvelope};
pub use error::{ToolError, ValidationError};
pub use registry::ToolRegistry;
pub use router::build_tool_router;
