//! Proximity search tool and its response normalizer.

pub mod model;
pub mod normalize;
pub mod search_around;

pub use model::{Provider, SearchLocation, SearchResult};
pub use normalize::{NormalizeError, compute_feedback_rating, normalize_providers};
pub use search_around::{SearchParams, SearchTool};
