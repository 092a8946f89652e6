//! Spatial index over one feature collection.

use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{info, warn};

use super::geometry;
use crate::models::{Feature, ProjectedPoint};

/// Wrapper for R-tree indexing of a feature.
///
/// The bounding box and centroid are computed once here so queries never
/// walk a ring just to reject a candidate or to take a bearing.
pub struct IndexedFeature<A> {
    pub feature: Arc<Feature<A>>,
    pub centroid: ProjectedPoint,
    envelope: AABB<[f64; 2]>,
}

impl<A> Clone for IndexedFeature<A> {
    fn clone(&self) -> Self {
        Self {
            feature: Arc::clone(&self.feature),
            centroid: self.centroid,
            envelope: self.envelope,
        }
    }
}

impl<A> RTreeObject for IndexedFeature<A> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl<A> IndexedFeature<A> {
    /// `None` when the geometry is empty.
    pub fn new(feature: Feature<A>) -> Option<Self> {
        let rect = geometry::bounding_box(&feature.geometry)?;
        let centroid = geometry::centroid(&feature.geometry)?;
        Some(Self {
            feature: Arc::new(feature),
            centroid,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }

    pub fn id(&self) -> i64 {
        self.feature.id
    }
}

/// Immutable spatial index for one collection, keyed by feature identifier.
pub struct FeatureIndex<A> {
    tree: RTree<IndexedFeature<A>>,
}

impl<A> FeatureIndex<A> {
    /// Build the index. Features without geometry are dropped.
    ///
    /// Identifier uniqueness is the loader's invariant; the index only relies
    /// on identifiers for ordering.
    pub fn build(name: &str, features: Vec<Feature<A>>) -> Self {
        let total = features.len();

        let indexed: Vec<IndexedFeature<A>> = features
            .into_iter()
            .filter_map(|feature| {
                let id = feature.id;
                let indexed = IndexedFeature::new(feature);
                if indexed.is_none() {
                    warn!("{}: feature {} has empty geometry, not indexed", name, id);
                }
                indexed
            })
            .collect();

        let tree = RTree::bulk_load(indexed);

        info!(
            "Spatial index for {} built with {} of {} features",
            name,
            tree.size(),
            total
        );

        Self { tree }
    }

    /// The feature with the smallest identifier whose geometry contains the
    /// point.
    pub fn locate(&self, point: ProjectedPoint) -> Option<&IndexedFeature<A>> {
        if !point.is_finite() {
            return None;
        }
        let query_envelope = AABB::from_point([point.x(), point.y()]);

        // Use R-tree to get candidates via envelope intersection, then filter with exact containment
        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ib| geometry::contains(&ib.feature.geometry, point))
            .min_by_key(|ib| ib.id())
    }

    /// Every feature within `radius` meters of the point, in identifier order.
    pub fn range_query(&self, point: ProjectedPoint, radius: f64) -> Vec<&IndexedFeature<A>> {
        if !point.is_finite() || radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }
        let (x, y) = (point.x(), point.y());
        let query_envelope = AABB::from_corners([x - radius, y - radius], [x + radius, y + radius]);
        let radius_2 = radius * radius;

        let mut matches: Vec<&IndexedFeature<A>> = self
            .tree
            .locate_in_envelope_intersecting(&query_envelope)
            // Square envelope corners lie outside the disk
            .filter(|ib| ib.envelope.distance_2(&[x, y]) <= radius_2)
            .filter(|ib| geometry::distance(&ib.feature.geometry, point) <= radius)
            .collect();

        matches.sort_by_key(|ib| ib.id());
        matches
    }

    /// Get total number of indexed features
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

}

impl<A> Default for FeatureIndex<A> {
    fn default() -> Self {
        Self {
            tree: RTree::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};

    fn square(id: i64, x0: f64, y0: f64, size: f64) -> Feature<&'static str> {
        let polygon = polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ];
        Feature::new(id, "square", MultiPolygon::new(vec![polygon]))
    }

    fn p(x: f64, y: f64) -> ProjectedPoint {
        ProjectedPoint::new(x, y)
    }

    #[test]
    fn test_empty_index() {
        let index: FeatureIndex<&str> = FeatureIndex::build("empty", vec![]);
        assert!(index.is_empty());
        assert!(index.locate(p(0.0, 0.0)).is_none());
        assert!(index.range_query(p(0.0, 0.0), 1_000.0).is_empty());
    }

    #[test]
    fn test_locate_returns_smallest_identifier() {
        // Inserted out of order; both contain (50, 50)
        let index = FeatureIndex::build(
            "overlap",
            vec![square(7, 0.0, 0.0, 100.0), square(3, 25.0, 25.0, 100.0)],
        );
        let hit = index.locate(p(50.0, 50.0)).unwrap();
        assert_eq!(hit.id(), 3);

        // Only the first square covers (10, 10)
        assert_eq!(index.locate(p(10.0, 10.0)).unwrap().id(), 7);
        assert!(index.locate(p(500.0, 500.0)).is_none());
    }

    #[test]
    fn test_bbox_hit_but_outside_geometry() {
        // L-shape: the bounding box covers (75, 75) but the polygon does not
        let l_shape = polygon![
            (x: 0.0, y: 0.0),
            (x: 100.0, y: 0.0),
            (x: 100.0, y: 50.0),
            (x: 50.0, y: 50.0),
            (x: 50.0, y: 100.0),
            (x: 0.0, y: 100.0),
            (x: 0.0, y: 0.0),
        ];
        let index = FeatureIndex::build(
            "l",
            vec![Feature::new(1, "l", MultiPolygon::new(vec![l_shape]))],
        );
        assert!(index.locate(p(75.0, 75.0)).is_none());
        assert!(index.locate(p(25.0, 75.0)).is_some());
    }

    #[test]
    fn test_range_query_is_id_ordered() {
        let index = FeatureIndex::build(
            "row",
            vec![
                square(30, 200.0, 0.0, 10.0),
                square(10, 0.0, 0.0, 10.0),
                square(20, 100.0, 0.0, 10.0),
            ],
        );
        let ids: Vec<i64> = index
            .range_query(p(105.0, 5.0), 1_000.0)
            .iter()
            .map(|ib| ib.id())
            .collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }

    #[test]
    fn test_range_query_excludes_envelope_corner() {
        // Box corner at (0, 0); query point 80 m away on both axes (113 m
        // diagonal) so the square envelope overlaps but the disk does not
        let index = FeatureIndex::build("corner", vec![square(1, -10.0, -10.0, 10.0)]);
        assert!(index.range_query(p(80.0, 80.0), 100.0).is_empty());
        assert_eq!(index.range_query(p(80.0, 80.0), 120.0).len(), 1);
    }

    #[test]
    fn test_radius_monotonicity() {
        let features: Vec<Feature<&str>> = (0..20)
            .map(|i| square(i, (i as f64) * 150.0, ((i * 7) % 5) as f64 * 90.0, 40.0))
            .collect();
        let index = FeatureIndex::build("grid", features);
        let origin = p(600.0, 100.0);

        let radii = [0.0, 10.0, 100.0, 250.0, 500.0, 1_000.0, 5_000.0];
        for pair in radii.windows(2) {
            let small: Vec<i64> = index
                .range_query(origin, pair[0])
                .iter()
                .map(|ib| ib.id())
                .collect();
            let large: Vec<i64> = index
                .range_query(origin, pair[1])
                .iter()
                .map(|ib| ib.id())
                .collect();
            assert!(
                small.iter().all(|id| large.contains(id)),
                "r={} gave {:?}, r={} gave {:?}",
                pair[0],
                small,
                pair[1],
                large
            );
        }
    }

    #[test]
    fn test_range_query_rejects_bad_input() {
        let index = FeatureIndex::build("one", vec![square(1, 0.0, 0.0, 10.0)]);
        assert!(index.range_query(p(5.0, 5.0), -1.0).is_empty());
        assert!(index.range_query(p(5.0, 5.0), f64::NAN).is_empty());
        assert!(index
            .range_query(ProjectedPoint::unprojectable(), 100.0)
            .is_empty());
        assert!(index.locate(ProjectedPoint::unprojectable()).is_none());
    }

    #[test]
    fn test_empty_geometry_is_dropped() {
        let index = FeatureIndex::build(
            "mixed",
            vec![
                square(1, 0.0, 0.0, 10.0),
                Feature::new(2, "empty", MultiPolygon::new(vec![])),
            ],
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.locate(p(5.0, 5.0)).unwrap().id(), 1);
    }
}
