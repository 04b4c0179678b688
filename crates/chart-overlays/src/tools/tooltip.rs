// File: crates/chart-overlays/src/tools/tooltip.rs
// Summary: Crosshair-following delta tooltip primitive and the tool that (de)activates it.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::{ChartApi, MouseEventParams, PrimitiveHandle, SeriesApi, SubscriptionId};
use crate::overlays::vertical_line::fill_column;
use crate::primitive::{PaneRenderer, PaneView, PrimitiveBase, RenderTarget, SeriesPrimitive};
use crate::series::Candle;
use crate::text::TextShaper;
use crate::theme::Rgba;
use crate::types::{Coordinate, Time};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeltaTooltipOptions {
    pub line_color: Rgba,
    pub show_time: bool,
    /// Media pixels between the pane top and the label.
    pub top_offset: f32,
    pub label_background: Rgba,
    pub label_text_color: Rgba,
    pub font_size: f32,
}

impl Default for DeltaTooltipOptions {
    fn default() -> Self {
        Self {
            line_color: Rgba::new(0, 0, 0, 0.2),
            show_time: true,
            top_offset: 20.0,
            label_background: Rgba::new(255, 255, 255, 0.9),
            label_text_color: Rgba::opaque(0x19, 0x19, 0x19),
            font_size: 12.0,
        }
    }
}

/// Close, delta and percent change of one bar, plus its UTC time when `show_time`.
pub fn format_label(candle: &Candle, show_time: bool) -> String {
    let delta = candle.delta();
    let mut label = format!("C {:.2}  Δ {:+.2}", candle.close, delta);
    if candle.open != 0.0 {
        label.push_str(&format!(" ({:+.2}%)", delta / candle.open * 100.0));
    }
    if show_time {
        if let Some(t) = DateTime::from_timestamp(candle.time, 0) {
            label.push('\n');
            label.push_str(&t.format("%Y-%m-%d %H:%M UTC").to_string());
        }
    }
    label
}

pub struct DeltaTooltipPaneView {
    pub x: Option<Coordinate>,
    pub label: Option<String>,
    options: DeltaTooltipOptions,
    shaper: Rc<TextShaper>,
}

impl PaneView for DeltaTooltipPaneView {
    fn renderer(&self) -> &dyn PaneRenderer { self }
}

impl PaneRenderer for DeltaTooltipPaneView {
    fn draw(&self, target: &RenderTarget<'_>) {
        let Some(x) = self.x else { return };
        fill_column(target, x, 1.0, self.options.top_offset, self.options.line_color);

        let Some(label) = &self.label else { return };
        let hr = target.horizontal_pixel_ratio;
        let lx = ((x + 6.0) * hr).round();
        let ly = (self.options.top_offset * target.vertical_pixel_ratio).round();
        self.shaper.draw_boxed(
            target.canvas,
            label,
            (lx, ly),
            self.options.font_size * hr,
            self.options.label_text_color.to_skia(),
            self.options.label_background.to_skia(),
        );
    }
}

/// Transient measurement overlay: vertical guide plus a close/delta label for the hovered bar.
pub struct DeltaTooltip {
    base: PrimitiveBase,
    options: DeltaTooltipOptions,
    hover: Option<Time>,
    shaper: Rc<TextShaper>,
    views: Vec<DeltaTooltipPaneView>,
}

impl DeltaTooltip {
    pub fn new(options: DeltaTooltipOptions) -> Self {
        Self {
            base: PrimitiveBase::new("delta-tooltip"),
            options,
            hover: None,
            shaper: Rc::new(TextShaper::new()),
            views: Vec::new(),
        }
    }

    pub fn options(&self) -> DeltaTooltipOptions { self.options }

    /// Follow the crosshair; no point or no bar hides the tooltip.
    pub fn set_hover(&mut self, params: &MouseEventParams) {
        self.hover = params.point.and(params.time);
        self.update_all_views();
    }

    pub fn view(&self) -> Option<&DeltaTooltipPaneView> { self.views.first() }
}

impl SeriesPrimitive for DeltaTooltip {
    fn base(&self) -> &PrimitiveBase { &self.base }
    fn base_mut(&mut self) -> &mut PrimitiveBase { &mut self.base }

    fn update_all_views(&mut self) {
        self.views.clear();
        if !self.base.should_render() {
            return;
        }
        let Some(time) = self.hover else { return };
        let (Ok(chart), Ok(series)) = (self.base.chart(), self.base.series()) else { return };
        // snap the guide to the bar rather than the raw pointer
        let x = chart.time_to_coordinate(time);
        let label = series.bar_at(time).map(|c| format_label(&c, self.options.show_time));
        self.views.push(DeltaTooltipPaneView {
            x,
            label,
            options: self.options,
            shaper: Rc::clone(&self.shaper),
        });
    }

    fn pane_views(&self) -> Vec<&dyn PaneView> {
        self.views.iter().map(|v| v as &dyn PaneView).collect()
    }
}

/// Attaches the tooltip and feeds it crosshair moves while active.
pub struct DeltaTooltipTool {
    chart: Rc<dyn ChartApi>,
    series: Rc<dyn SeriesApi>,
    tooltip: Rc<RefCell<DeltaTooltip>>,
    subscription: RefCell<Option<SubscriptionId>>,
}

impl DeltaTooltipTool {
    pub fn new(chart: Rc<dyn ChartApi>, series: Rc<dyn SeriesApi>, options: DeltaTooltipOptions) -> Self {
        Self {
            chart,
            series,
            tooltip: Rc::new(RefCell::new(DeltaTooltip::new(options))),
            subscription: RefCell::new(None),
        }
    }

    pub fn is_active(&self) -> bool { self.subscription.borrow().is_some() }

    pub fn tooltip(&self) -> Rc<RefCell<DeltaTooltip>> { Rc::clone(&self.tooltip) }

    pub fn activate(&self) {
        if self.is_active() {
            return;
        }
        let handle: PrimitiveHandle = self.tooltip.clone();
        self.series.attach_primitive(handle);
        let weak = Rc::downgrade(&self.tooltip);
        let id = self.chart.subscribe_crosshair_move(Rc::new(move |p: &MouseEventParams| {
            if let Some(tooltip) = weak.upgrade() {
                tooltip.borrow_mut().set_hover(p);
            }
        }));
        *self.subscription.borrow_mut() = Some(id);
        debug!("delta tooltip activated");
    }

    pub fn deactivate(&self) {
        let Some(id) = self.subscription.borrow_mut().take() else { return };
        self.chart.unsubscribe_crosshair_move(id);
        let handle: PrimitiveHandle = self.tooltip.clone();
        self.series.detach_primitive(&handle);
        self.tooltip.borrow_mut().set_hover(&MouseEventParams::default());
        debug!("delta tooltip deactivated");
    }
}
