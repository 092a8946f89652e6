//! HTTP handlers for point lookups and proximity searches.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use aurum::models::{Claim, Coordinate, DatasetKind, District, Feature};
use aurum::pip::{CompassLabel, QueryEngine, SearchResult};

/// Application state shared across handlers
pub struct AppState {
    pub engine: QueryEngine,
}

type Rejection = (StatusCode, Json<ErrorDetail>);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/lookup", get(district_lookup_handler))
        .route("/claim_lookup", get(active_claim_lookup_handler))
        .route("/inactive_claim_lookup", get(inactive_claim_lookup_handler))
        .route("/search/districts", get(search_districts_handler))
        .route("/search/active_claims", get(search_active_claims_handler))
        .route("/search/inactive_claims", get(search_inactive_claims_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
struct LookupParams {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct SearchParams {
    lat: f64,
    lon: f64,
    /// Meters; engine default when absent
    radius: Option<f64>,
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: &'static str,
}

fn not_found(kind: DatasetKind) -> Rejection {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorDetail {
            detail: kind.not_found_message(),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    districts: usize,
    active_claims: usize,
    inactive_claims: usize,
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let engine = &state.engine;
    Json(HealthResponse {
        status: "ok",
        districts: engine.count(DatasetKind::Districts),
        active_claims: engine.count(DatasetKind::ActiveClaims),
        inactive_claims: engine.count(DatasetKind::InactiveClaims),
    })
}

#[derive(Serialize)]
struct DistrictLookup {
    name: String,
    info: Option<String>,
}

/// Claim fields shared by lookups and searches; `name_N` is claimant column N
#[derive(Serialize)]
struct ClaimSummary {
    name: Option<String>,
    commodity: Option<String>,
    acres: Option<f64>,
    name_1: Option<String>,
    name_2: Option<String>,
    name_3: Option<String>,
    name_4: Option<String>,
}

impl From<&Claim> for ClaimSummary {
    fn from(claim: &Claim) -> Self {
        let name = |slot| claim.claimant_name(slot).map(str::to_string);
        Self {
            name: claim.claim_name.clone(),
            commodity: claim.commodity.clone(),
            acres: claim.acres,
            name_1: name(0),
            name_2: name(1),
            name_3: name(2),
            name_4: name(3),
        }
    }
}

#[derive(Serialize)]
struct ClaimLookup {
    #[serde(flatten)]
    summary: ClaimSummary,
    location_date: Option<String>,
}

impl From<&Claim> for ClaimLookup {
    fn from(claim: &Claim) -> Self {
        Self {
            summary: ClaimSummary::from(claim),
            location_date: claim.location_date.clone(),
        }
    }
}

async fn district_lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<DistrictLookup>, Rejection> {
    let district = state
        .engine
        .locate_district(Coordinate::new(params.lon, params.lat))
        .ok_or_else(|| not_found(DatasetKind::Districts))?;

    Ok(Json(DistrictLookup {
        name: district.attributes.name.clone(),
        info: district.attributes.webpage.clone(),
    }))
}

async fn active_claim_lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<ClaimLookup>, Rejection> {
    let claim = state
        .engine
        .locate_active_claim(Coordinate::new(params.lon, params.lat))
        .ok_or_else(|| not_found(DatasetKind::ActiveClaims))?;

    Ok(Json(ClaimLookup::from(&claim.attributes)))
}

async fn inactive_claim_lookup_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<ClaimLookup>, Rejection> {
    let claim = state
        .engine
        .locate_inactive_claim(Coordinate::new(params.lon, params.lat))
        .ok_or_else(|| not_found(DatasetKind::InactiveClaims))?;

    Ok(Json(ClaimLookup::from(&claim.attributes)))
}

/// Position of a result relative to the query point
#[derive(Serialize)]
struct Placement {
    contains: bool,
    distance_meters: f64,
    bearing_degrees: f64,
    direction_label: CompassLabel,
}

impl<A> From<&SearchResult<A>> for Placement {
    fn from(result: &SearchResult<A>) -> Self {
        Self {
            contains: result.contains,
            distance_meters: result.distance_meters,
            bearing_degrees: result.bearing_degrees,
            direction_label: result.direction,
        }
    }
}

#[derive(Serialize)]
struct DistrictHit {
    id: i64,
    name: String,
    webpage: Option<String>,
    #[serde(flatten)]
    placement: Placement,
}

impl From<&SearchResult<District>> for DistrictHit {
    fn from(result: &SearchResult<District>) -> Self {
        let Feature { id, attributes, .. } = result.feature.as_ref();
        Self {
            id: *id,
            name: attributes.name.clone(),
            webpage: attributes.webpage.clone(),
            placement: Placement::from(result),
        }
    }
}

#[derive(Serialize)]
struct ClaimHit {
    id: i64,
    serial_no: Option<String>,
    #[serde(flatten)]
    summary: ClaimSummary,
    /// Present (possibly null) for inactive claims only
    #[serde(skip_serializing_if = "Option::is_none")]
    location_date: Option<Option<String>>,
    #[serde(flatten)]
    placement: Placement,
}

impl ClaimHit {
    fn new(result: &SearchResult<Claim>, with_location_date: bool) -> Self {
        let claim = &result.feature.attributes;
        Self {
            id: result.feature.id,
            serial_no: claim.serial_no.clone(),
            summary: ClaimSummary::from(claim),
            location_date: with_location_date.then(|| claim.location_date.clone()),
            placement: Placement::from(result),
        }
    }
}

async fn search_districts_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<DistrictHit>> {
    let results = state
        .engine
        .search_districts(Coordinate::new(params.lon, params.lat), params.radius);
    Json(results.iter().map(DistrictHit::from).collect())
}

async fn search_active_claims_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<ClaimHit>> {
    let results = state
        .engine
        .search_active_claims(Coordinate::new(params.lon, params.lat), params.radius);
    Json(results.iter().map(|r| ClaimHit::new(r, false)).collect())
}

async fn search_inactive_claims_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<ClaimHit>> {
    let results = state
        .engine
        .search_inactive_claims(Coordinate::new(params.lon, params.lat), params.radius);
    Json(results.iter().map(|r| ClaimHit::new(r, true)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aurum::models::Claimant;
    use aurum::pip::FeatureIndex;
    use aurum::Projector;
    use axum::body::Body;
    use axum::http::Request;
    use geo::{polygon, MultiPolygon};
    use serde_json::Value;
    use tower::ServiceExt;

    const ASPEN: &str = "lat=39.1997&lon=-106.8253";

    fn square_around((x, y): (f64, f64), half: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x - half, y: y - half),
            (x: x + half, y: y - half),
            (x: x + half, y: y + half),
            (x: x - half, y: y + half),
            (x: x - half, y: y - half),
        ]])
    }

    fn claim(name: &str) -> Claim {
        Claim {
            serial_no: Some("CMC000001".to_string()),
            claim_name: Some(name.to_string()),
            commodity: Some("SILVER".to_string()),
            acres: Some(20.66),
            location_date: Some("1998-06-12".to_string()),
            // name_2 blank in the source record
            claimants: [
                Some(Claimant {
                    name: "SMUGGLER MINING CO".to_string(),
                    ..Default::default()
                }),
                None,
                Some(Claimant {
                    name: "J DOE".to_string(),
                    ..Default::default()
                }),
                None,
            ],
            ..Default::default()
        }
    }

    fn undated_claim(name: &str) -> Claim {
        Claim {
            location_date: None,
            ..claim(name)
        }
    }

    fn app(with_features: bool) -> Router {
        let projector = Projector::utm_13n().unwrap();
        let projected = projector.project(Coordinate::new(-106.8253, 39.1997));
        let aspen = (projected.x(), projected.y());

        let (districts, active, inactive) = if with_features {
            (
                vec![Feature::new(
                    1,
                    District {
                        name: "Roaring Fork".to_string(),
                        webpage: Some("https://example.org/roaring-fork".to_string()),
                    },
                    square_around(aspen, 5_000.0),
                )],
                vec![Feature::new(11, claim("LITTLE ANNIE"), square_around(aspen, 100.0))],
                vec![
                    Feature::new(
                        21,
                        claim("OLD SMUGGLER"),
                        square_around((aspen.0 + 600.0, aspen.1), 50.0),
                    ),
                    Feature::new(
                        22,
                        undated_claim("NO DATE"),
                        square_around((aspen.0, aspen.1 - 800.0), 50.0),
                    ),
                ],
            )
        } else {
            (vec![], vec![], vec![])
        };

        let engine = QueryEngine::new(
            projector,
            FeatureIndex::build("districts", districts),
            FeatureIndex::build("active_claims", active),
            FeatureIndex::build("inactive_claims", inactive),
        );
        router(Arc::new(AppState { engine }))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    #[tokio::test]
    async fn test_district_lookup() {
        let (status, body) = get_json(app(true), &format!("/lookup?{}", ASPEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Roaring Fork");
        assert_eq!(body["info"], "https://example.org/roaring-fork");
    }

    #[tokio::test]
    async fn test_lookup_not_found() {
        let (status, body) = get_json(app(false), &format!("/lookup?{}", ASPEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "No mining district found for the given point.");

        let (status, body) = get_json(app(false), &format!("/claim_lookup?{}", ASPEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "No active claim found for the given point.");

        // Inactive claim sits 600 m east, so Aspen itself is outside it
        let (status, body) =
            get_json(app(true), &format!("/inactive_claim_lookup?{}", ASPEN)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "No inactive claim found for the given point.");
    }

    #[tokio::test]
    async fn test_claim_lookup_fields() {
        let (status, body) = get_json(app(true), &format!("/claim_lookup?{}", ASPEN)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "LITTLE ANNIE");
        assert_eq!(body["commodity"], "SILVER");
        assert_eq!(body["acres"], 20.66);
        assert_eq!(body["name_1"], "SMUGGLER MINING CO");
        assert!(body["name_2"].is_null());
        assert_eq!(body["name_3"], "J DOE");
        assert!(body["name_4"].is_null());
        assert_eq!(body["location_date"], "1998-06-12");
    }

    #[test]
    fn test_claim_lookup_null_location_date() {
        let body = serde_json::to_value(ClaimLookup::from(&Claim::default())).unwrap();
        let fields = body.as_object().unwrap();
        assert_eq!(fields.get("location_date"), Some(&Value::Null));
        assert_eq!(fields.get("name_4"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_missing_parameters_rejected() {
        let (status, _) = get_json(app(true), "/lookup?lat=39.1997").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app(true), "/search/districts?lat=abc&lon=-106.8").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_inactive_claims() {
        let (status, body) =
            get_json(app(true), &format!("/search/inactive_claims?{}", ASPEN)).await;
        assert_eq!(status, StatusCode::OK);

        let hits = body.as_array().unwrap();
        assert_eq!(hits.len(), 2);
        let hit = &hits[0];
        assert_eq!(hit["id"], 21);
        assert_eq!(hit["name"], "OLD SMUGGLER");
        assert_eq!(hit["serial_no"], "CMC000001");
        assert_eq!(hit["name_3"], "J DOE");
        assert_eq!(hit["location_date"], "1998-06-12");
        assert_eq!(hit["contains"], false);
        assert_eq!(hit["direction_label"], "E");
        let distance = hit["distance_meters"].as_f64().unwrap();
        assert!((distance - 550.0).abs() < 1e-6, "distance {}", distance);

        let undated = hits[1].as_object().unwrap();
        assert_eq!(undated["id"], 22);
        assert_eq!(undated.get("location_date"), Some(&Value::Null));
        assert_eq!(undated["direction_label"], "S");
    }

    #[tokio::test]
    async fn test_search_active_claims() {
        let (status, body) =
            get_json(app(true), &format!("/search/active_claims?{}", ASPEN)).await;
        assert_eq!(status, StatusCode::OK);

        let hits = body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        let hit = hits[0].as_object().unwrap();
        assert_eq!(hit["id"], 11);
        assert_eq!(hit["contains"], true);
        assert_eq!(hit["distance_meters"], 0.0);
        assert!(hit.contains_key("direction_label"));
        assert!(!hit.contains_key("direction"));
        assert!(!hit.contains_key("location_date"));
    }

    #[tokio::test]
    async fn test_search_radius() {
        // 550 m away: outside a 500 m radius
        let (_, body) = get_json(
            app(true),
            &format!("/search/inactive_claims?{}&radius=500", ASPEN),
        )
        .await;
        assert_eq!(body, Value::Array(vec![]));

        let (_, body) =
            get_json(app(true), &format!("/search/districts?{}&radius=10", ASPEN)).await;
        let hits = body.as_array().unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["contains"], true);
        assert_eq!(hits[0]["distance_meters"], 0.0);
    }

    #[tokio::test]
    async fn test_health_counts() {
        let (status, body) = get_json(app(true), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["districts"], 1);
        assert_eq!(body["active_claims"], 1);
        assert_eq!(body["inactive_claims"], 2);
    }
}
