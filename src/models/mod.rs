//! Core data models for the mining polygon datasets.

pub mod coordinate;
pub mod feature;

pub use coordinate::{Coordinate, ProjectedPoint};
pub use feature::{Claim, Claimant, DatasetKind, District, Feature, CLAIMANT_SLOTS};
