//! Geographic input coordinates and their projected counterparts.

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// A position in NAD83 / UTM zone 13N (EPSG:26913), in meters.
///
/// Created by the projector for query input and by geometry helpers for
/// centroids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    x: f64,
    y: f64,
}

impl ProjectedPoint {
    pub(crate) fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Marker for inputs the projection refused.
    pub(crate) fn unprojectable() -> Self {
        Self::new(f64::NAN, f64::NAN)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// False when the projection could not place the coordinate.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Planar distance in meters.
    pub fn distance_to(&self, other: &ProjectedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub(crate) fn from_point(point: geo::Point<f64>) -> Self {
        Self::new(point.x(), point.y())
    }

    pub(crate) fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.x, self.y)
    }
}
