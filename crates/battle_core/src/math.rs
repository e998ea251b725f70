//! Cell coordinate math.
//!
//! Positions are `f32` pairs in cell units. A position built from integer
//! row/col is a grid cell; interpolated positions sit between cells. All
//! arithmetic is plain IEEE-754 single precision evaluated in a fixed
//! order, which is what keeps replays bit-identical.

use serde::{Deserialize, Serialize};

/// A 2D position on the playfield, in cell units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CellPos {
    /// Row coordinate.
    pub row: f32,
    /// Column coordinate.
    pub col: f32,
}

impl CellPos {
    /// Create a new cell position.
    #[must_use]
    pub const fn new(row: f32, col: f32) -> Self {
        Self { row, col }
    }

    /// Position of the integer grid cell at `row`, `col`.
    #[must_use]
    pub fn from_grid(row: usize, col: usize) -> Self {
        Self::new(row as f32, col as f32)
    }

    /// Calculate squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let d_row = self.row - other.row;
        let d_col = self.col - other.col;
        d_row * d_row + d_col * d_col
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Linearly interpolate from `self` towards `other`.
    ///
    /// Evaluated as `(other - self) * t + self` so results match the
    /// client-side playback exactly.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        (other - self) * t + self
    }

    /// Round both coordinates to `precision` decimal places.
    #[must_use]
    pub fn rounded(self, precision: u32) -> Self {
        Self::new(round_to(self.row, precision), round_to(self.col, precision))
    }

    /// Raw bit patterns, for hashing.
    #[must_use]
    pub fn to_bits(self) -> (u32, u32) {
        (self.row.to_bits(), self.col.to_bits())
    }
}

/// Round `value` to `precision` decimal places.
#[must_use]
pub fn round_to(value: f32, precision: u32) -> f32 {
    let scale = 10f64.powi(precision as i32);
    ((f64::from(value) * scale).round() / scale) as f32
}

impl std::ops::Add for CellPos {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            row: self.row + rhs.row,
            col: self.col + rhs.col,
        }
    }
}

impl std::ops::Sub for CellPos {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            row: self.row - rhs.row,
            col: self.col - rhs.col,
        }
    }
}

impl std::ops::Mul<f32> for CellPos {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            row: self.row * rhs,
            col: self.col * rhs,
        }
    }
}
