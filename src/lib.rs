//! Aurum - point lookups against Colorado mining districts and claims
//!
//! This library provides the projection, spatial index and query engine
//! shared by the query server and the ingest tool.

pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pip;
pub mod projection;

pub use error::{LoadError, ProjectionError};
pub use models::{Claim, Coordinate, DatasetKind, District, Feature, ProjectedPoint};
pub use pip::{CompassLabel, QueryEngine, SearchResult};
pub use projection::Projector;
