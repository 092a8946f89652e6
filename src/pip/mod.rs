//! Point-in-Polygon (PIP) lookup and proximity search.
//!
//! Holds the mining collections in R-tree spatial indexes and answers
//! containment and radius queries against them.

pub mod compass;
pub mod geometry;
mod index;
mod service;

pub use compass::{to_compass_label, CompassLabel};
pub use index::{FeatureIndex, IndexedFeature};
pub use service::{QueryEngine, SearchResult, DEFAULT_SEARCH_RADIUS_M};
