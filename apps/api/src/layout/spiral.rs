//! Archimedean spiral cursor used to search outward for a free spot.
//!
//! The step rule is part of the cloud's visual output: every constant here
//! changes where words land, so they are fixed values and covered by tests.

use std::f64::consts::TAU;

pub const INITIAL_RADIUS: f64 = 1.0;
pub const RADIUS_INCREMENT: f64 = 5.0;
pub const INITIAL_ARC_LENGTH: f64 = 5.0;

/// Per-word search cursor. Positions are offsets from the box center.
#[derive(Debug, Clone, PartialEq)]
pub struct SpiralState {
    pub radius: f64,
    pub radius_increment: f64,
    /// Upper bound on the distance travelled along the arc per step.
    pub arc_length: f64,
    pub angle: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for SpiralState {
    fn default() -> Self {
        Self {
            radius: INITIAL_RADIUS,
            radius_increment: RADIUS_INCREMENT,
            arc_length: INITIAL_ARC_LENGTH,
            angle: 0.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl SpiralState {
    /// Advances one step. The step covers at most a tenth of the current
    /// circumference; completing a turn grows the radius.
    pub fn advance(&mut self) {
        let circumference = TAU * self.radius;
        let inc = (circumference / 10.0).min(self.arc_length);
        let da = inc / self.radius;
        let mut next = self.angle + da;

        if next > TAU {
            next %= TAU;
            self.radius += self.radius_increment;
        }

        self.angle = next;
        self.x = self.radius * next.cos();
        self.y = self.radius * next.sin();
    }

    /// Called after a border hit: widen the angular step so the cursor
    /// sweeps past the boundary faster.
    pub fn widen(&mut self) {
        self.arc_length = self.radius;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
