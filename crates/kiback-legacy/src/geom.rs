//! Unit conversion and placement geometry for the legacy formats.
//!
//! The new format measures in millimeters and degrees; the legacy format
//! measures in integer mils (1/1000 inch) and, for some records, tenths of a
//! degree.

use serde::Serialize;

/// Convert a length in millimeters to legacy mils.
///
/// Truncates toward zero. The legacy writers in the v4 tool chain did the
/// same, so rounding here would shift coordinates by one mil against files
/// they produced.
pub fn to_mil(mm: f64) -> i64 {
    (mm * 1000.0 / 25.4) as i64
}

/// Quadrant index for an angle in degrees: 0 for 0°, 1 for 90°, and so on.
///
/// Angles are snapped to the nearest right angle; the modulus is Euclidean so
/// negative angles still land in `0..=3`.
pub fn quadrant(angle: f64) -> usize {
    (((angle + 45.0) / 90.0) as i64).rem_euclid(4) as usize
}

/// Mirror axis of a placed symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Mirror {
    #[default]
    None,
    X,
    Y,
}

impl Mirror {
    pub fn from_name(name: &str) -> Mirror {
        match name {
            "x" => Mirror::X,
            "y" => Mirror::Y,
            _ => Mirror::None,
        }
    }
}

/// Base matrices for the four quadrants. Legacy schematic coordinates grow
/// downward, hence the sign flip on the y row.
const QUADRANT_MATRICES: [[i64; 4]; 4] = [
    [1, 0, 0, -1],
    [0, -1, -1, 0],
    [-1, 0, 0, 1],
    [0, 1, 1, 0],
];

/// 2x2 orientation matrix for a placed symbol, row-major `[m0 m1; m2 m3]`.
pub fn orientation_matrix(angle: f64, mirror: Mirror) -> [i64; 4] {
    let mut m = QUADRANT_MATRICES[quadrant(angle)];
    match mirror {
        Mirror::Y => {
            m[0] = -m[0];
            m[2] = -m[2];
        }
        Mirror::X => {
            m[1] = -m[1];
            m[3] = -m[3];
        }
        Mirror::None => {}
    }
    m
}

/// Map a point through an orientation matrix around the placement origin.
pub fn apply(m: [i64; 4], origin: (i64, i64), point: (i64, i64)) -> (i64, i64) {
    let (x0, y0) = origin;
    let dx = point.0 - x0;
    let dy = point.1 - y0;
    (x0 + dx * m[0] + dy * m[1], y0 + dx * m[2] + dy * m[3])
}

/// Print a float the way the source file spelled it: whole values without a
/// fractional part. Used where the legacy record passes an angle through
/// unconverted.
pub fn compact(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
