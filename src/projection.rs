//! Geographic to UTM zone 13N coordinate transform.
//!
//! All containment, distance and bearing math happens in EPSG:26913 meters,
//! so every incoming coordinate passes through [`Projector::project`] first.

use geo::{Coord, MapCoords, MultiPolygon};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::debug;

use crate::error::ProjectionError;
use crate::models::{Coordinate, ProjectedPoint};

/// EPSG code of the planar system the engine works in.
pub const TARGET_EPSG: u32 = 26913;

/// WGS84 geographic (EPSG:4326)
pub const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// NAD83 geographic (EPSG:4269)
pub const NAD83_PROJ: &str = "+proj=longlat +datum=NAD83 +no_defs";

/// NAD83 / UTM zone 13N (EPSG:26913)
pub const UTM_13N_PROJ: &str = "+proj=utm +zone=13 +datum=NAD83 +units=m +no_defs";

/// Transform from one geographic frame into NAD83 / UTM zone 13N.
///
/// Built once at startup and shared by every query.
pub struct Projector {
    source: Proj,
    target: Proj,
    source_epsg: u32,
}

impl std::fmt::Debug for Projector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Projector")
            .field("source_epsg", &self.source_epsg)
            .field("target_epsg", &TARGET_EPSG)
            .finish()
    }
}

impl Projector {
    /// WGS84 lon/lat to UTM 13N, the transform applied to query input.
    pub fn utm_13n() -> Result<Self, ProjectionError> {
        Self::from_epsg(4326)
    }

    /// Transform from a supported geographic EPSG code (4326 or 4269).
    pub fn from_epsg(epsg: u32) -> Result<Self, ProjectionError> {
        let definition = match epsg {
            4326 => WGS84_PROJ,
            4269 => NAD83_PROJ,
            _ => return Err(ProjectionError::UnsupportedCrs { epsg }),
        };

        Ok(Self {
            source: build(definition)?,
            target: build(UTM_13N_PROJ)?,
            source_epsg: epsg,
        })
    }

    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Project a query coordinate.
    ///
    /// Never fails: inputs the projection refuses come back as a non-finite
    /// point, which matches no polygon.
    pub fn project(&self, coordinate: Coordinate) -> ProjectedPoint {
        match self.to_utm(coordinate.lon, coordinate.lat) {
            Ok((x, y)) => ProjectedPoint::new(x, y),
            Err(e) => {
                debug!(
                    "Coordinate ({}, {}) outside projection domain: {}",
                    coordinate.lon, coordinate.lat, e
                );
                ProjectedPoint::unprojectable()
            }
        }
    }

    /// Reproject a whole geometry from degrees into meters.
    pub fn project_multi_polygon(
        &self,
        geometry: &MultiPolygon<f64>,
    ) -> Result<MultiPolygon<f64>, ProjectionError> {
        geometry.try_map_coords(|coord: Coord<f64>| {
            let (x, y) = self.to_utm(coord.x, coord.y)?;
            if x.is_finite() && y.is_finite() {
                Ok(Coord { x, y })
            } else {
                Err(ProjectionError::Transform {
                    x: coord.x,
                    y: coord.y,
                    source: proj4rs::errors::Error::CoordinateOutOfRange,
                })
            }
        })
    }

    fn to_utm(&self, lon: f64, lat: f64) -> Result<(f64, f64), ProjectionError> {
        // Radians in, meters out
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.source, &self.target, &mut point).map_err(|source| {
            ProjectionError::Transform {
                x: lon,
                y: lat,
                source,
            }
        })?;
        Ok((point.0, point.1))
    }
}

fn build(definition: &'static str) -> Result<Proj, ProjectionError> {
    Proj::from_proj_string(definition)
        .map_err(|source| ProjectionError::Definition { definition, source })
}
