//! Exact geometric tests on projected multipolygons.
//!
//! Polygons are treated as closed sets: a point on an outer ring or on a
//! hole's ring belongs to the polygon. With that convention a point is
//! contained exactly when its distance to the geometry is zero.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Bearing, BoundingRect, Centroid, Distance, Euclidean, MultiPolygon, Rect};

use crate::models::ProjectedPoint;

/// Whether the point lies inside (or on the boundary of) any constituent
/// polygon, outside that polygon's holes.
pub fn contains(geometry: &MultiPolygon<f64>, point: ProjectedPoint) -> bool {
    if !point.is_finite() {
        return false;
    }
    let coord = point.to_point().0;

    // Per polygon rather than on the whole multipolygon: the OGC mod-2 rule
    // would put a point on an edge shared by two parts outside both.
    geometry
        .0
        .iter()
        .any(|polygon| polygon.coordinate_position(&coord) != CoordPos::Outside)
}

/// Planar distance in meters from the point to the geometry.
///
/// Zero when contained, otherwise the distance to the nearest boundary
/// point over every polygon (outer rings and holes).
pub fn distance(geometry: &MultiPolygon<f64>, point: ProjectedPoint) -> f64 {
    if !point.is_finite() {
        return f64::INFINITY;
    }
    if contains(geometry, point) {
        return 0.0;
    }

    let point = point.to_point();
    geometry
        .0
        .iter()
        .map(|polygon| Euclidean.distance(&point, polygon))
        .fold(f64::INFINITY, f64::min)
}

/// Area-weighted centroid; `None` for an empty geometry.
pub fn centroid(geometry: &MultiPolygon<f64>) -> Option<ProjectedPoint> {
    geometry.centroid().map(ProjectedPoint::from_point)
}

/// Grid azimuth from `from` to `to`, clockwise from north, in [0, 360).
///
/// Coincident points give 0.
pub fn bearing(from: ProjectedPoint, to: ProjectedPoint) -> f64 {
    let degrees = Euclidean.bearing(from.to_point(), to.to_point());
    // (-tiny + 360) can round up to exactly 360
    if degrees >= 360.0 {
        0.0
    } else {
        degrees
    }
}

/// Axis-aligned bounding box; `None` for an empty geometry.
pub fn bounding_box(geometry: &MultiPolygon<f64>) -> Option<Rect<f64>> {
    geometry.bounding_rect()
}
