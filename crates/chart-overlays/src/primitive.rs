// File: crates/chart-overlays/src/primitive.rs
// Summary: Overlay lifecycle base plus the pane-view / renderer contract shared by every primitive.

use std::rc::Rc;

use skia_safe as skia;
use tracing::debug;

use crate::error::PrimitiveError;
use crate::geometry::BitmapSpan;
use crate::host::{ChartApi, SeriesApi, SeriesAttachedParameter};
use crate::theme::Rgba;

/// Where a primitive stands relative to its host.
#[derive(Clone, Default)]
pub enum Lifecycle {
    /// Never attached; host access is a contract violation.
    #[default]
    Unattached,
    Attached(SeriesAttachedParameter),
    /// Was attached once; produces no geometry.
    Detached,
}

/// Attach/detach/visibility state embedded in every concrete primitive.
pub struct PrimitiveBase {
    name: &'static str,
    lifecycle: Lifecycle,
    visible: bool,
}

impl PrimitiveBase {
    pub fn new(name: &'static str) -> Self {
        Self { name, lifecycle: Lifecycle::Unattached, visible: true }
    }

    pub fn name(&self) -> &'static str { self.name }

    pub fn lifecycle(&self) -> &Lifecycle { &self.lifecycle }

    pub fn attach(&mut self, param: SeriesAttachedParameter) {
        debug!(primitive = self.name, "attached");
        self.lifecycle = Lifecycle::Attached(param);
    }

    pub fn detach(&mut self) {
        if matches!(self.lifecycle, Lifecycle::Attached(_)) {
            debug!(primitive = self.name, "detached");
            self.lifecycle = Lifecycle::Detached;
        }
    }

    pub fn is_attached(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Attached(_))
    }

    /// Schedule a host refresh; no-op while unattached.
    pub fn request_update(&self) {
        if let Lifecycle::Attached(param) = &self.lifecycle {
            param.chart.request_update();
        }
    }

    fn hosts(&self) -> Result<&SeriesAttachedParameter, PrimitiveError> {
        match &self.lifecycle {
            Lifecycle::Attached(param) => Ok(param),
            _ => Err(PrimitiveError::NotAttached { primitive: self.name }),
        }
    }

    pub fn chart(&self) -> Result<Rc<dyn ChartApi>, PrimitiveError> {
        self.hosts().map(|h| Rc::clone(&h.chart))
    }

    pub fn series(&self) -> Result<Rc<dyn SeriesApi>, PrimitiveError> {
        self.hosts().map(|h| Rc::clone(&h.series))
    }

    /// Returns true when the flag actually changed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        let changed = self.visible != visible;
        self.visible = visible;
        changed
    }

    pub fn is_visible(&self) -> bool { self.visible }

    /// Attached and visible.
    pub fn should_render(&self) -> bool {
        self.visible && self.is_attached()
    }

    /// Drawing is allowed once the primitive has been attached at least once.
    pub fn ensure_renderable(&self) -> Result<(), PrimitiveError> {
        match self.lifecycle {
            Lifecycle::Unattached => Err(PrimitiveError::NotAttached { primitive: self.name }),
            _ => Ok(()),
        }
    }
}

/// Canvas plus the media -> bitmap scale factors for one paint pass.
pub struct RenderTarget<'a> {
    pub canvas: &'a skia::Canvas,
    pub horizontal_pixel_ratio: f32,
    pub vertical_pixel_ratio: f32,
    /// Pane size in bitmap pixels.
    pub bitmap_width: i32,
    pub bitmap_height: i32,
}

impl<'a> RenderTarget<'a> {
    pub fn new(canvas: &'a skia::Canvas, pixel_ratio: f32, bitmap_width: i32, bitmap_height: i32) -> Self {
        Self {
            canvas,
            horizontal_pixel_ratio: pixel_ratio,
            vertical_pixel_ratio: pixel_ratio,
            bitmap_width,
            bitmap_height,
        }
    }

    /// Fill the bitmap-space box spanned by `h` x `v`.
    pub fn fill_spans(&self, h: BitmapSpan, v: BitmapSpan, color: Rgba) {
        let mut paint = skia::Paint::default();
        paint.set_style(skia::paint::Style::Fill);
        paint.set_color(color.to_skia());
        self.canvas.draw_rect(
            skia::Rect::from_xywh(h.position as f32, v.position as f32, h.length as f32, v.length as f32),
            &paint,
        );
    }
}

/// Stateless paint routine over precomputed pixel data.
///
/// Implementations must skip any element whose coordinates are `None`.
pub trait PaneRenderer {
    fn draw(&self, target: &RenderTarget<'_>);
}

/// Pixel-space geometry for one overlay, recomputed by its owner on `update_all_views`.
pub trait PaneView {
    fn renderer(&self) -> &dyn PaneRenderer;
}

/// Price range an overlay wants included in the host's autoscale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoscaleInfo {
    pub min_value: f64,
    pub max_value: f64,
}

impl AutoscaleInfo {
    /// Min/max over `prices`; `None` when empty.
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Option<Self> {
        prices.into_iter().filter(|p| p.is_finite()).fold(None, |acc, p| match acc {
            None => Some(Self { min_value: p, max_value: p }),
            Some(r) => Some(Self { min_value: r.min_value.min(p), max_value: r.max_value.max(p) }),
        })
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            min_value: self.min_value.min(other.min_value),
            max_value: self.max_value.max(other.max_value),
        }
    }
}

/// Overlay attachable to a host series.
///
/// Concrete types embed a [`PrimitiveBase`] and implement `update_all_views`,
/// which must clear the pane views whenever `should_render()` is false.
pub trait SeriesPrimitive {
    fn base(&self) -> &PrimitiveBase;
    fn base_mut(&mut self) -> &mut PrimitiveBase;

    /// Recompute every pane view from current logical data and host scales.
    fn update_all_views(&mut self);

    /// Pane views regardless of visibility.
    fn pane_views(&self) -> Vec<&dyn PaneView>;

    fn autoscale_info(&self) -> Option<AutoscaleInfo> { None }

    fn name(&self) -> &'static str { self.base().name() }

    fn attached(&mut self, param: SeriesAttachedParameter) {
        self.base_mut().attach(param);
        self.update_all_views();
    }

    fn detached(&mut self) {
        self.base_mut().detach();
        self.update_all_views();
    }

    /// A change also schedules a host refresh so autoscale follows visibility.
    fn set_visible(&mut self, visible: bool) {
        if self.base_mut().set_visible(visible) {
            self.update_all_views();
            self.base().request_update();
        }
    }

    fn is_visible(&self) -> bool { self.base().is_visible() }

    /// What the host paints: empty while hidden.
    fn visible_pane_views(&self) -> Vec<&dyn PaneView> {
        if self.base().is_visible() { self.pane_views() } else { Vec::new() }
    }

    /// Paint every visible pane view. Fails if the primitive was never attached.
    fn draw(&self, target: &RenderTarget<'_>) -> Result<(), PrimitiveError> {
        self.base().ensure_renderable()?;
        for view in self.visible_pane_views() {
            view.renderer().draw(target);
        }
        Ok(())
    }
}
