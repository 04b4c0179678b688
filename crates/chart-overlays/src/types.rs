// File: crates/chart-overlays/src/types.rs
// Summary: Shared types and constants (logical points, media coordinates, sizes, paddings).

use serde::{Deserialize, Serialize};

/// Bar timestamp, UTC seconds.
pub type Time = i64;
/// Media (CSS-like) pixel coordinate, relative to the pane origin.
pub type Coordinate = f32;

/// Default surface width in media pixels.
pub const WIDTH: i32 = 1024;
/// Default surface height in media pixels.
pub const HEIGHT: i32 = 640;

/// Logical, scale-independent position on the chart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub time: Time,
    pub price: f64,
}

impl Point {
    pub const fn new(time: Time, price: f64) -> Self {
        Self { time, price }
    }
}

/// Position in media pixels inside the pane.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct MediaPoint {
    pub x: Coordinate,
    pub y: Coordinate,
}

impl MediaPoint {
    pub const fn new(x: Coordinate, y: Coordinate) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: MediaPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Screen margins around the pane, in media pixels.
/// Contract: all fields are non-negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Insets {
    /// Create new insets (non-negative by type).
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }
    /// Total horizontal inset (left + right).
    pub const fn hsum(&self) -> u32 { self.left + self.right }
    /// Total vertical inset (top + bottom).
    pub const fn vsum(&self) -> u32 { self.top + self.bottom }
}

impl Default for Insets {
    fn default() -> Self {
        Self::new(8, 64, 16, 24)
    }
}
