//! Attribute extraction from GeoJSON feature properties.
//!
//! Column names follow the source shapefiles (`gid`, `district`,
//! `claim_nm`, `name_1`, ...). Values may arrive as strings or numbers
//! depending on the exporter, so readers accept both.

use geojson::{feature::Id, JsonObject, JsonValue};

use crate::error::{LoadError, Result};
use crate::models::{Claim, Claimant, District, CLAIMANT_SLOTS};

/// Resolve the numeric identifier: `gid` property first, then a numeric
/// GeoJSON `id` member.
pub fn identifier(properties: &JsonObject, id: Option<&Id>, index: usize) -> Result<i64> {
    if let Some(gid) = properties.get("gid").and_then(as_i64) {
        return Ok(gid);
    }
    match id {
        Some(Id::Number(n)) => n.as_i64(),
        Some(Id::String(s)) => s.trim().parse().ok(),
        None => None,
    }
    .ok_or(LoadError::MissingIdentifier { index })
}

pub fn district(id: i64, properties: &JsonObject) -> Result<District> {
    let name = text(properties, "district").ok_or(LoadError::MissingAttribute {
        id,
        field: "district",
    })?;

    Ok(District {
        name,
        webpage: text(properties, "webpage"),
    })
}

pub fn claim(_id: i64, properties: &JsonObject) -> Result<Claim> {
    // Columns are 1-based; a blank column leaves its slot empty
    let claimants: [Option<Claimant>; CLAIMANT_SLOTS] = std::array::from_fn(|slot| {
        let column = slot + 1;
        let name = text(properties, &format!("name_{}", column))?;
        Some(Claimant {
            name,
            interest_relation: text(properties, &format!("intrel_{}", column)),
            percent_interest: text(properties, &format!("perint_{}", column)),
        })
    });

    Ok(Claim {
        serial_no: text(properties, "serial_no"),
        disposition: text(properties, "dispositio"),
        case_type_code: text(properties, "casetyp_cd"),
        case_type_text: text(properties, "casetyp_tx"),
        acres: number(properties, "case_acres"),
        commodity: text(properties, "commodity"),
        geo_name: text(properties, "geo_name"),
        claim_name: text(properties, "claim_nm"),
        location_date: text(properties, "locate_dt"),
        update_date: text(properties, "update_dt"),
        claimants,
    })
}

/// Non-empty text value; numbers are rendered as written.
fn text(properties: &JsonObject, key: &str) -> Option<String> {
    match properties.get(key)? {
        JsonValue::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number(properties: &JsonObject, key: &str) -> Option<f64> {
    match properties.get(key)? {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
