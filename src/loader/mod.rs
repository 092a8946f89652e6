//! GeoJSON dataset loading.
//!
//! Each collection is one FeatureCollection file. Loading validates
//! identifiers and geometry, reprojects geographic input into EPSG:26913
//! once, and hands back features sorted by identifier, ready for
//! [`FeatureIndex::build`](crate::pip::FeatureIndex::build).

pub mod properties;

use std::fs;
use std::path::Path;

use geo::{Area, MultiPolygon, Polygon};
use geojson::{feature::Id, FeatureCollection, GeoJson, JsonObject, JsonValue};
use hashbrown::HashSet;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{LoadError, Result};
use crate::models::{Claim, District, Feature};
use crate::projection::{Projector, TARGET_EPSG};

/// EPSG code assumed when a file carries no `crs` member (RFC 7946).
pub const DEFAULT_SOURCE_EPSG: u32 = 4326;

/// A validated feature before attribute decoding.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: i64,
    pub properties: JsonObject,
    /// Geometry in EPSG:26913 meters
    pub geometry: MultiPolygon<f64>,
}

/// Validated, projected records of one file.
#[derive(Debug)]
pub struct RawDataset {
    /// Sorted by identifier
    pub records: Vec<Record>,
    /// CRS the file was read in
    pub source_epsg: u32,
    /// Features dropped for unusable geometry
    pub skipped: usize,
}

/// A typed collection ready to index.
#[derive(Debug)]
pub struct LoadedDataset<A> {
    pub features: Vec<Feature<A>>,
    pub source_epsg: u32,
    pub skipped: usize,
}

pub fn load_districts(path: &Path, source_epsg: Option<u32>) -> Result<LoadedDataset<District>> {
    load_with(path, source_epsg, properties::district)
}

pub fn load_claims(path: &Path, source_epsg: Option<u32>) -> Result<LoadedDataset<Claim>> {
    load_with(path, source_epsg, properties::claim)
}

fn load_with<A>(
    path: &Path,
    source_epsg: Option<u32>,
    decode: fn(i64, &JsonObject) -> Result<A>,
) -> Result<LoadedDataset<A>> {
    let raw = read_dataset(path, source_epsg)?;

    let features = raw
        .records
        .into_iter()
        .map(|record| -> Result<Feature<A>> {
            let attributes = decode(record.id, &record.properties)?;
            Ok(Feature::new(record.id, attributes, record.geometry))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(LoadedDataset {
        features,
        source_epsg: raw.source_epsg,
        skipped: raw.skipped,
    })
}

/// Read a FeatureCollection, validate it and bring it into EPSG:26913.
///
/// `source_epsg` overrides whatever the file declares.
pub fn read_dataset(path: &Path, source_epsg: Option<u32>) -> Result<RawDataset> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = content.parse().map_err(|source| LoadError::GeoJson {
        path: path.to_path_buf(),
        source: Box::new(source),
    })?;
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => {
            return Err(LoadError::NotAFeatureCollection {
                path: path.to_path_buf(),
            })
        }
    };

    let epsg = match source_epsg {
        Some(epsg) => epsg,
        None => declared_epsg(&collection, path)?,
    };
    // Fail on an unsupported CRS before doing any per-feature work
    let projector = match epsg {
        TARGET_EPSG => None,
        other => Some(Projector::from_epsg(other)?),
    };

    let total = collection.features.len();
    let mut seen = HashSet::with_capacity(total);
    let mut records = Vec::with_capacity(total);
    let mut skipped = 0;

    for (index, feature) in collection.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let id = properties::identifier(&properties, feature.id.as_ref(), index)?;
        if !seen.insert(id) {
            return Err(LoadError::DuplicateIdentifier { id });
        }

        let Some(geometry) = polygonal(id, feature.geometry) else {
            skipped += 1;
            continue;
        };
        let geometry = drop_degenerate(id, geometry);
        if geometry.0.is_empty() {
            warn!("{}: feature {} has no usable polygon, skipped", path.display(), id);
            skipped += 1;
            continue;
        }

        records.push(Record {
            id,
            properties,
            geometry,
        });
    }

    if let Some(projector) = &projector {
        records = records
            .into_par_iter()
            .map(|record| -> Result<Record> {
                let geometry = projector.project_multi_polygon(&record.geometry)?;
                Ok(Record { geometry, ..record })
            })
            .collect::<Result<Vec<_>>>()?;
    }

    records.sort_by_key(|record| record.id);

    info!(
        "Loaded {} of {} features from {} (EPSG:{})",
        records.len(),
        total,
        path.display(),
        epsg
    );

    Ok(RawDataset {
        records,
        source_epsg: epsg,
        skipped,
    })
}

/// Serialize projected records as an EPSG:26913 FeatureCollection.
pub fn to_feature_collection(records: &[Record]) -> FeatureCollection {
    let features = records
        .iter()
        .map(|record| geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&record.geometry))),
            id: Some(Id::Number(record.id.into())),
            properties: Some(record.properties.clone()),
            foreign_members: None,
        })
        .collect();

    let mut crs = JsonObject::new();
    crs.insert(
        "crs".to_string(),
        serde_json::json!({
            "type": "name",
            "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", TARGET_EPSG) }
        }),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(crs),
    }
}

/// EPSG code from the legacy `crs` member, defaulting to WGS84.
fn declared_epsg(collection: &FeatureCollection, path: &Path) -> Result<u32> {
    let name = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.get("properties"))
        .and_then(|props| props.get("name"))
        .and_then(JsonValue::as_str);

    let Some(name) = name else {
        return Ok(DEFAULT_SOURCE_EPSG);
    };

    // "EPSG:26913", "urn:ogc:def:crs:EPSG::26913" or "urn:ogc:def:crs:OGC:1.3:CRS84"
    let code = name.rsplit(':').next().unwrap_or(name);
    if code.eq_ignore_ascii_case("CRS84") {
        return Ok(DEFAULT_SOURCE_EPSG);
    }
    code.parse().map_err(|_| LoadError::UnrecognizedCrs {
        path: path.to_path_buf(),
        name: name.to_string(),
    })
}

fn polygonal(id: i64, geometry: Option<geojson::Geometry>) -> Option<MultiPolygon<f64>> {
    let Some(geometry) = geometry else {
        warn!("Feature {} has no geometry, skipped", id);
        return None;
    };
    match geo_types::Geometry::<f64>::try_from(geometry) {
        Ok(geo_types::Geometry::Polygon(polygon)) => Some(MultiPolygon::new(vec![polygon])),
        Ok(geo_types::Geometry::MultiPolygon(multi)) => Some(multi),
        Ok(_) => {
            warn!("Feature {} is not a polygon, skipped", id);
            None
        }
        Err(e) => {
            warn!("Feature {} has invalid geometry: {}", id, e);
            None
        }
    }
}

/// Remove polygons with a short exterior ring or no area.
fn drop_degenerate(id: i64, geometry: MultiPolygon<f64>) -> MultiPolygon<f64> {
    let before = geometry.0.len();
    let kept: Vec<Polygon<f64>> = geometry
        .into_iter()
        .filter(|polygon| polygon.exterior().0.len() >= 4 && polygon.unsigned_area() > 0.0)
        .collect();

    if kept.len() < before {
        warn!(
            "Feature {}: dropped {} degenerate polygon(s)",
            id,
            before - kept.len()
        );
    }
    MultiPolygon::new(kept)
}
