//! Fuzzy matching of picker candidates against the query.

pub mod engine;
pub mod types;

pub use engine::fuzzy_match;
pub use types::{MatchScore, ScoredCandidate};
