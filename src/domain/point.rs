use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the plane.
///
/// The backend exchanges points as two-element arrays, so the serde
/// representation goes through `[f64; 2]` while Rust code gets named fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Exact coordinate equality, treating `-0.0` and `0.0` as the same value.
    pub fn same_position(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Bit-level key usable in hash maps. Consistent with `same_position`
    /// for all non-NaN coordinates.
    pub fn position_key(&self) -> (u64, u64) {
        (normalize_zero(self.x).to_bits(), normalize_zero(self.y).to_bits())
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
