//! Eight-point compass labels for bearings.

use serde::Serialize;
use std::fmt;

/// A 45° compass sector, centered on its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CompassLabel {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassLabel {
    /// Sectors in clockwise order starting at north
    pub fn all() -> &'static [CompassLabel] {
        &[
            CompassLabel::N,
            CompassLabel::NE,
            CompassLabel::E,
            CompassLabel::SE,
            CompassLabel::S,
            CompassLabel::SW,
            CompassLabel::W,
            CompassLabel::NW,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassLabel::N => "N",
            CompassLabel::NE => "NE",
            CompassLabel::E => "E",
            CompassLabel::SE => "SE",
            CompassLabel::S => "S",
            CompassLabel::SW => "SW",
            CompassLabel::W => "W",
            CompassLabel::NW => "NW",
        }
    }
}

impl fmt::Display for CompassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a bearing in degrees to its compass sector.
///
/// Shifting by half a sector puts each sector's lower edge on a multiple of
/// 45°, so 22.5° is the first bearing labelled NE.
pub fn to_compass_label(bearing_degrees: f64) -> CompassLabel {
    let shifted = (bearing_degrees + 22.5).rem_euclid(360.0);
    let index = (shifted / 45.0).floor() as usize;
    // rem_euclid can return 360.0 for tiny negative inputs
    CompassLabel::all()[index % 8]
}
