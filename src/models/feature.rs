//! Feature records for the three mining datasets.

use std::fmt;
use std::str::FromStr;

use geo::MultiPolygon;
/// The three collections the engine serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Historical mining districts
    Districts,
    /// Active mining claims
    ActiveClaims,
    /// Closed or void mining claims
    InactiveClaims,
}

impl DatasetKind {
    pub fn all() -> &'static [DatasetKind] {
        &[
            DatasetKind::Districts,
            DatasetKind::ActiveClaims,
            DatasetKind::InactiveClaims,
        ]
    }

    /// Config and log key
    pub fn field_name(&self) -> &'static str {
        match self {
            DatasetKind::Districts => "districts",
            DatasetKind::ActiveClaims => "active_claims",
            DatasetKind::InactiveClaims => "inactive_claims",
        }
    }

    /// Message returned when a lookup finds nothing.
    pub fn not_found_message(&self) -> &'static str {
        match self {
            DatasetKind::Districts => "No mining district found for the given point.",
            DatasetKind::ActiveClaims => "No active claim found for the given point.",
            DatasetKind::InactiveClaims => "No inactive claim found for the given point.",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl FromStr for DatasetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "districts" => Ok(DatasetKind::Districts),
            "active_claims" => Ok(DatasetKind::ActiveClaims),
            "inactive_claims" => Ok(DatasetKind::InactiveClaims),
            other => Err(format!(
                "unknown dataset '{}' (expected districts, active-claims or inactive-claims)",
                other
            )),
        }
    }
}

/// A record from one collection: identifier, attributes and footprint.
#[derive(Debug, Clone)]
pub struct Feature<A> {
    /// Primary identifier (`gid`), unique within a collection
    pub id: i64,
    pub attributes: A,
    /// Geometry in EPSG:26913 meters
    pub geometry: MultiPolygon<f64>,
}

impl<A> Feature<A> {
    pub fn new(id: i64, attributes: A, geometry: MultiPolygon<f64>) -> Self {
        Self {
            id,
            attributes,
            geometry,
        }
    }
}

/// Historical mining district attributes
#[derive(Debug, Clone, PartialEq)]
pub struct District {
    pub name: String,
    /// Link to the district's information page
    pub webpage: Option<String>,
}

/// A party holding an interest in a claim.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claimant {
    pub name: String,
    pub interest_relation: Option<String>,
    pub percent_interest: Option<String>,
}

/// Number of claimant columns (`name_1` .. `name_4`) in the land records.
pub const CLAIMANT_SLOTS: usize = 4;

/// Mining claim attributes, shared by the active and inactive collections.
///
/// Dates are kept as the free-form strings the land records carry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Claim {
    pub serial_no: Option<String>,
    pub disposition: Option<String>,
    pub case_type_code: Option<String>,
    pub case_type_text: Option<String>,
    pub acres: Option<f64>,
    pub commodity: Option<String>,
    pub geo_name: Option<String>,
    pub claim_name: Option<String>,
    pub location_date: Option<String>,
    pub update_date: Option<String>,
    /// Indexed by column: slot 0 holds `name_1`; blank columns stay empty
    pub claimants: [Option<Claimant>; CLAIMANT_SLOTS],
}

impl Claim {
    /// Claimant name at a 0-based slot, if present.
    pub fn claimant_name(&self, slot: usize) -> Option<&str> {
        self.claimants
            .get(slot)
            .and_then(Option::as_ref)
            .map(|c| c.name.as_str())
    }
}
