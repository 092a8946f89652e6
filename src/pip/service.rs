//! Query engine: locate and proximity search over the three collections.

use std::sync::Arc;
use tracing::debug;

use super::compass::{to_compass_label, CompassLabel};
use super::geometry;
use super::FeatureIndex;
use crate::models::{Claim, Coordinate, DatasetKind, District, Feature};
use crate::projection::Projector;

/// Radius used when a search does not name one.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 1_000.0;

/// One feature near the query point, annotated relative to it.
#[derive(Debug, Clone)]
pub struct SearchResult<A> {
    pub feature: Arc<Feature<A>>,
    /// Point lies in the feature's geometry (boundary included)
    pub contains: bool,
    /// Zero exactly when `contains`
    pub distance_meters: f64,
    /// Azimuth from the query point to the feature's centroid, [0, 360)
    pub bearing_degrees: f64,
    pub direction: CompassLabel,
}

/// Read-only engine over the loaded collections.
///
/// Constructed once at startup and shared behind an `Arc`; every method
/// takes `&self` and touches no shared mutable state.
pub struct QueryEngine {
    projector: Projector,
    districts: FeatureIndex<District>,
    active_claims: FeatureIndex<Claim>,
    inactive_claims: FeatureIndex<Claim>,
}

impl QueryEngine {
    pub fn new(
        projector: Projector,
        districts: FeatureIndex<District>,
        active_claims: FeatureIndex<Claim>,
        inactive_claims: FeatureIndex<Claim>,
    ) -> Self {
        Self {
            projector,
            districts,
            active_claims,
            inactive_claims,
        }
    }

    pub fn locate_district(&self, coordinate: Coordinate) -> Option<Arc<Feature<District>>> {
        locate_at(&self.projector, &self.districts, DatasetKind::Districts, coordinate)
    }

    pub fn locate_active_claim(&self, coordinate: Coordinate) -> Option<Arc<Feature<Claim>>> {
        locate_at(
            &self.projector,
            &self.active_claims,
            DatasetKind::ActiveClaims,
            coordinate,
        )
    }

    pub fn locate_inactive_claim(&self, coordinate: Coordinate) -> Option<Arc<Feature<Claim>>> {
        locate_at(
            &self.projector,
            &self.inactive_claims,
            DatasetKind::InactiveClaims,
            coordinate,
        )
    }

    pub fn search_districts(
        &self,
        coordinate: Coordinate,
        radius: Option<f64>,
    ) -> Vec<SearchResult<District>> {
        search_near(
            &self.projector,
            &self.districts,
            DatasetKind::Districts,
            coordinate,
            radius,
        )
    }

    pub fn search_active_claims(
        &self,
        coordinate: Coordinate,
        radius: Option<f64>,
    ) -> Vec<SearchResult<Claim>> {
        search_near(
            &self.projector,
            &self.active_claims,
            DatasetKind::ActiveClaims,
            coordinate,
            radius,
        )
    }

    pub fn search_inactive_claims(
        &self,
        coordinate: Coordinate,
        radius: Option<f64>,
    ) -> Vec<SearchResult<Claim>> {
        search_near(
            &self.projector,
            &self.inactive_claims,
            DatasetKind::InactiveClaims,
            coordinate,
            radius,
        )
    }

    /// Number of indexed features per collection
    pub fn count(&self, kind: DatasetKind) -> usize {
        match kind {
            DatasetKind::Districts => self.districts.len(),
            DatasetKind::ActiveClaims => self.active_claims.len(),
            DatasetKind::InactiveClaims => self.inactive_claims.len(),
        }
    }
}

fn locate_at<A>(
    projector: &Projector,
    index: &FeatureIndex<A>,
    kind: DatasetKind,
    coordinate: Coordinate,
) -> Option<Arc<Feature<A>>> {
    let point = projector.project(coordinate);
    let hit = index.locate(point).map(|ib| Arc::clone(&ib.feature));

    debug!(
        "Locate {} at ({}, {}) -> ({:.2}, {:.2}): {:?}",
        kind,
        coordinate.lon,
        coordinate.lat,
        point.x(),
        point.y(),
        hit.as_ref().map(|f| f.id)
    );

    hit
}

fn search_near<A>(
    projector: &Projector,
    index: &FeatureIndex<A>,
    kind: DatasetKind,
    coordinate: Coordinate,
    radius: Option<f64>,
) -> Vec<SearchResult<A>> {
    let radius = radius.unwrap_or(DEFAULT_SEARCH_RADIUS_M);
    if !(radius.is_finite() && radius > 0.0) {
        debug!("Search {} with radius {}: nothing to do", kind, radius);
        return Vec::new();
    }

    let point = projector.project(coordinate);
    let results: Vec<SearchResult<A>> = index
        .range_query(point, radius)
        .into_iter()
        .map(|ib| {
            let contains = geometry::contains(&ib.feature.geometry, point);
            let distance_meters = if contains {
                0.0
            } else {
                geometry::distance(&ib.feature.geometry, point)
            };
            let bearing_degrees = geometry::bearing(point, ib.centroid);

            SearchResult {
                feature: Arc::clone(&ib.feature),
                contains,
                distance_meters,
                bearing_degrees,
                direction: to_compass_label(bearing_degrees),
            }
        })
        .collect();

    debug!(
        "Search {} within {} m of ({}, {}): {} results",
        kind,
        radius,
        coordinate.lon,
        coordinate.lat,
        results.len()
    );

    results
}
