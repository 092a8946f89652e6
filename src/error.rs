//! Error types for dataset loading and projection setup.
//!
//! The query path itself has no error type: a query that matches nothing is
//! an ordinary empty result.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to build or apply the coordinate transform.
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Failed to build projection '{definition}': {source}")]
    Definition {
        definition: &'static str,
        #[source]
        source: proj4rs::errors::Error,
    },

    #[error("Coordinate ({x}, {y}) could not be reprojected: {source}")]
    Transform {
        x: f64,
        y: f64,
        #[source]
        source: proj4rs::errors::Error,
    },

    #[error("Reprojection from EPSG:{epsg} is not supported")]
    UnsupportedCrs { epsg: u32 },
}

/// Failure to turn a dataset file into a collection.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid GeoJSON in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("Expected a FeatureCollection in {path}")]
    NotAFeatureCollection { path: PathBuf },

    #[error("Unrecognized CRS '{name}' in {path}")]
    UnrecognizedCrs { path: PathBuf, name: String },

    #[error("Feature #{index} has no usable numeric identifier")]
    MissingIdentifier { index: usize },

    #[error("Feature {id} is missing required attribute '{field}'")]
    MissingAttribute { id: i64, field: &'static str },

    #[error("Duplicate feature identifier {id}")]
    DuplicateIdentifier { id: i64 },

    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

pub type Result<T> = std::result::Result<T, LoadError>;
