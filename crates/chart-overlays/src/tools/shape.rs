// File: crates/chart-overlays/src/tools/shape.rs
// Summary: Shape strategies (geometry, hit test, paint) plugged into the two-point drawing machinery.

use serde::{Deserialize, Serialize};
use skia_safe as skia;

use crate::geometry::{distance_to_line, MediaRect};
use crate::primitive::RenderTarget;
use crate::theme::Rgba;
use crate::types::MediaPoint;

/// Pixel distance under which a pointer counts as touching a trend line.
pub const TREND_LINE_HIT_TOLERANCE: f32 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawingKind {
    #[serde(rename = "rectangle")]
    Rectangle,
    #[serde(rename = "trendline")]
    TrendLine,
}

impl DrawingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawingKind::Rectangle => "rectangle",
            DrawingKind::TrendLine => "trendline",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub color: Rgba,
    /// Multiplied into the fill (rectangle) or the stroke (trend line).
    pub opacity: f32,
    /// Border or stroke width in media pixels.
    pub line_width: f32,
}

impl ShapeStyle {
    pub const fn new(color: Rgba, opacity: f32, line_width: f32) -> Self {
        Self { color, opacity, line_width }
    }
}

/// Committed and live-preview styling for one tool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOptions {
    pub final_style: ShapeStyle,
    pub preview_style: ShapeStyle,
}

impl ToolOptions {
    pub fn rectangle() -> Self {
        Self {
            final_style: ShapeStyle::new(Rgba::new(76, 175, 80, 0.5), 0.5, 1.0),
            preview_style: ShapeStyle::new(Rgba::new(76, 175, 80, 0.2), 0.2, 1.0),
        }
    }

    pub fn trend_line() -> Self {
        let blue = Rgba::opaque(0x21, 0x96, 0xf3);
        Self {
            final_style: ShapeStyle::new(blue, 1.0, 2.0),
            preview_style: ShapeStyle::new(blue, 0.5, 2.0),
        }
    }
}

/// Geometry of one two-point shape kind.
pub trait ShapeStrategy: 'static {
    const KIND: DrawingKind;
    const NAME: &'static str;

    fn default_options() -> ToolOptions;

    /// Degenerate shapes never hit.
    fn hit_test(a: MediaPoint, b: MediaPoint, p: MediaPoint) -> bool;

    /// Paint between media points `a` and `b`; degenerate shapes paint nothing.
    fn draw(target: &RenderTarget<'_>, a: MediaPoint, b: MediaPoint, style: &ShapeStyle);
}

/// Axis-aligned box spanned by two corners.
pub struct RectangleShape;

impl ShapeStrategy for RectangleShape {
    const KIND: DrawingKind = DrawingKind::Rectangle;
    const NAME: &'static str = "rectangle";

    fn default_options() -> ToolOptions { ToolOptions::rectangle() }

    fn hit_test(a: MediaPoint, b: MediaPoint, p: MediaPoint) -> bool {
        let rect = MediaRect::from_corners(a, b);
        !rect.is_degenerate() && rect.contains(p)
    }

    fn draw(target: &RenderTarget<'_>, a: MediaPoint, b: MediaPoint, style: &ShapeStyle) {
        let hr = target.horizontal_pixel_ratio;
        let vr = target.vertical_pixel_ratio;
        let r = MediaRect::from_corners(a, b);
        if r.is_degenerate() {
            return;
        }
        let left = (r.left * hr).round();
        let right = (r.right * hr).round();
        let top = (r.top * vr).round();
        let bottom = (r.bottom * vr).round();
        let rect = skia::Rect::from_ltrb(left, top, right, bottom);

        let mut fill = skia::Paint::default();
        fill.set_style(skia::paint::Style::Fill);
        fill.set_color(style.color.with_opacity(style.opacity).to_skia());
        target.canvas.draw_rect(rect, &fill);

        let mut border = skia::Paint::default();
        border.set_style(skia::paint::Style::Stroke);
        border.set_stroke_width((style.line_width * hr).max(1.0));
        border.set_color(style.color.to_skia());
        target.canvas.draw_rect(rect, &border);
    }
}

/// Straight segment between two anchors.
pub struct TrendLineShape;

impl ShapeStrategy for TrendLineShape {
    const KIND: DrawingKind = DrawingKind::TrendLine;
    const NAME: &'static str = "trend-line";

    fn default_options() -> ToolOptions { ToolOptions::trend_line() }

    fn hit_test(a: MediaPoint, b: MediaPoint, p: MediaPoint) -> bool {
        distance_to_line(p, a, b).is_some_and(|d| d < TREND_LINE_HIT_TOLERANCE)
    }

    fn draw(target: &RenderTarget<'_>, a: MediaPoint, b: MediaPoint, style: &ShapeStyle) {
        if a.distance_to(b) <= f32::EPSILON {
            return;
        }
        let hr = target.horizontal_pixel_ratio;
        let vr = target.vertical_pixel_ratio;
        let mut paint = skia::Paint::default();
        paint.set_anti_alias(true);
        paint.set_style(skia::paint::Style::Stroke);
        paint.set_stroke_width((style.line_width * hr).max(1.0));
        paint.set_color(style.color.with_opacity(style.opacity).to_skia());
        target.canvas.draw_line(
            ((a.x * hr).round(), (a.y * vr).round()),
            ((b.x * hr).round(), (b.y * vr).round()),
            &paint,
        );
    }
}
