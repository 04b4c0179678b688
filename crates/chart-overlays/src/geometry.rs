// File: crates/chart-overlays/src/geometry.rs
// Summary: Lightweight geometry helpers for pixel math (media -> bitmap rounding, spans, distances).

use crate::host::{ChartApi, SeriesApi};
use crate::types::{Coordinate, MediaPoint, Point, Time};

/// A run of whole bitmap pixels along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitmapSpan {
    pub position: i32,
    pub length: i32,
}

impl BitmapSpan {
    pub const fn end(&self) -> i32 { self.position + self.length }
}

/// Bitmap span covering the media interval between `a` and `b` (in either order).
///
/// Both ends are rounded independently so adjacent spans share edges.
pub fn positions_box(a: Coordinate, b: Coordinate, pixel_ratio: f32) -> BitmapSpan {
    let sa = (a * pixel_ratio).round() as i32;
    let sb = (b * pixel_ratio).round() as i32;
    BitmapSpan { position: sa.min(sb), length: (sb - sa).abs() + 1 }
}

/// Bitmap span of a line `width_media` wide centred on `center`.
pub fn positions_line(center: Coordinate, pixel_ratio: f32, width_media: f32) -> BitmapSpan {
    let scaled = (center * pixel_ratio).round() as i32;
    let width = ((width_media * pixel_ratio).round() as i32).max(1);
    BitmapSpan { position: scaled - width / 2, length: width }
}

/// Axis-aligned rectangle in media pixels. Contract: left <= right, top <= bottom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaRect {
    pub left: Coordinate,
    pub top: Coordinate,
    pub right: Coordinate,
    pub bottom: Coordinate,
}

impl MediaRect {
    pub fn from_corners(a: MediaPoint, b: MediaPoint) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }
    pub fn width(&self) -> f32 { self.right - self.left }
    pub fn height(&self) -> f32 { self.bottom - self.top }
    pub fn is_degenerate(&self) -> bool { self.width() <= 0.0 || self.height() <= 0.0 }
    /// Inclusive on every edge.
    pub fn contains(&self, p: MediaPoint) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

/// Map a logical point to media pixels; `None` if either axis is off its domain.
pub fn map_point(chart: &dyn ChartApi, series: &dyn SeriesApi, point: Point) -> Option<MediaPoint> {
    let x = chart.time_to_coordinate(point.time)?;
    let y = series.price_to_coordinate(point.price)?;
    Some(MediaPoint::new(x, y))
}

/// Map a logical [time, price] span to a normalised media rectangle.
pub fn span_to_rect(
    chart: &dyn ChartApi,
    series: &dyn SeriesApi,
    times: [Time; 2],
    prices: [f64; 2],
) -> Option<MediaRect> {
    let a = map_point(chart, series, Point::new(times[0], prices[0]))?;
    let b = map_point(chart, series, Point::new(times[1], prices[1]))?;
    Some(MediaRect::from_corners(a, b))
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
/// Returns `None` when `a == b`.
pub fn distance_to_line(p: MediaPoint, a: MediaPoint, b: MediaPoint) -> Option<f32> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return None;
    }
    Some(((p.x - a.x) * dy - (p.y - a.y) * dx).abs() / len)
}
