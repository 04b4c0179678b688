// File: crates/chart-overlays/src/overlays/vertical_line.rs
// Summary: Full-height marker line at a fixed bar time.

use serde::{Deserialize, Serialize};
use skia_safe as skia;

use crate::primitive::{PaneRenderer, PaneView, PrimitiveBase, RenderTarget, SeriesPrimitive};
use crate::theme::Rgba;
use crate::types::{Coordinate, Time};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VerticalLineOptions {
    pub color: Rgba,
    /// Media pixels.
    pub width: f32,
}

impl Default for VerticalLineOptions {
    fn default() -> Self {
        Self { color: Rgba::opaque(0x3e, 0x3f, 0x40), width: 2.0 }
    }
}

/// Fill a column starting at media `x`, `width` wide, from media `top` to the pane bottom.
pub(crate) fn fill_column(target: &RenderTarget<'_>, x: Coordinate, width: f32, top: f32, color: Rgba) {
    let hr = target.horizontal_pixel_ratio;
    let top_px = (top * target.vertical_pixel_ratio).round().max(0.0);
    let rect = skia::Rect::from_xywh(
        x * hr,
        top_px,
        (width * hr).max(1.0),
        (target.bitmap_height as f32 - top_px).max(0.0),
    );
    let mut paint = skia::Paint::default();
    paint.set_color(color.to_skia());
    target.canvas.draw_rect(rect, &paint);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VerticalLinePaneView {
    pub x: Option<Coordinate>,
    options: VerticalLineOptions,
}

impl PaneView for VerticalLinePaneView {
    fn renderer(&self) -> &dyn PaneRenderer { self }
}

impl PaneRenderer for VerticalLinePaneView {
    fn draw(&self, target: &RenderTarget<'_>) {
        if let Some(x) = self.x {
            fill_column(target, x, self.options.width, 0.0, self.options.color);
        }
    }
}

pub struct VerticalLine {
    base: PrimitiveBase,
    time: Time,
    options: VerticalLineOptions,
    views: Vec<VerticalLinePaneView>,
}

impl VerticalLine {
    pub fn new(time: Time, options: VerticalLineOptions) -> Self {
        Self { base: PrimitiveBase::new("vertical-line"), time, options, views: Vec::new() }
    }

    pub fn time(&self) -> Time { self.time }

    pub fn view(&self) -> Option<&VerticalLinePaneView> { self.views.first() }
}

impl SeriesPrimitive for VerticalLine {
    fn base(&self) -> &PrimitiveBase { &self.base }
    fn base_mut(&mut self) -> &mut PrimitiveBase { &mut self.base }

    fn update_all_views(&mut self) {
        self.views.clear();
        if !self.base.should_render() {
            return;
        }
        if let Ok(chart) = self.base.chart() {
            self.views.push(VerticalLinePaneView { x: chart.time_to_coordinate(self.time), options: self.options });
        }
    }

    fn pane_views(&self) -> Vec<&dyn PaneView> {
        self.views.iter().map(|v| v as &dyn PaneView).collect()
    }
}
