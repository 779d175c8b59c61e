//! Center-anchored boxes and the two collision tests used by the cloud packer.
//!
//! All boxes here are described by their center point plus full width/height,
//! matching how the spiral search reports candidate positions.

use serde::{Deserialize, Serialize};

/// Rectangular layout canvas. `(x, y)` is the center of the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// A box of the given size centered on the origin.
    pub fn centered(width: f64, height: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// True if any edge of `b` falls outside this box.
    pub fn border_collides(&self, b: &CenteredBox) -> bool {
        b.x + b.width / 2.0 > self.x + self.width / 2.0
            || b.x - b.width / 2.0 < self.x - self.width / 2.0
            || b.y + b.height / 2.0 > self.y + self.height / 2.0
            || b.y - b.height / 2.0 < self.y - self.height / 2.0
    }
}

/// Measured text extent, in the same units as the bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextSize {
    pub width: f64,
    pub height: f64,
}

impl TextSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// A candidate or committed word box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenteredBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl CenteredBox {
    pub fn new(x: f64, y: f64, size: TextSize) -> Self {
        Self {
            x,
            y,
            width: size.width,
            height: size.height,
        }
    }

    /// Strict overlap test: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &CenteredBox) -> bool {
        (self.x - other.x).abs() * 2.0 < self.width + other.width
            && (self.y - other.y).abs() * 2.0 < self.height + other.height
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
