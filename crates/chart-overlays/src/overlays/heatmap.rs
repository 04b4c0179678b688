// File: crates/chart-overlays/src/overlays/heatmap.rs
// Summary: Order-book liquidity heatmap; one intensity-shaded line per resting order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::positions_box;
use crate::primitive::{AutoscaleInfo, PaneRenderer, PaneView, PrimitiveBase, RenderTarget, SeriesPrimitive};
use crate::theme::{Rgba, Theme};
use crate::types::{Coordinate, Time};

/// Alpha ceiling so dense levels never hide the candles underneath.
pub const MAX_ORDER_ALPHA: f32 = 0.5;
/// Order line thickness in media pixels.
pub const HEATMAP_LINE_HEIGHT: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapOrder {
    pub price: f64,
    pub volume: f64,
    pub start_time: Time,
    pub end_time: Time,
    pub is_bid: bool,
}

/// Top-of-book snapshot valid over `[time, end_time]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBookSnapshot {
    pub time: Time,
    pub end_time: Time,
    pub bid: f64,
    pub ask: f64,
    pub bid_volume: f64,
    pub ask_volume: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LiquidityHeatmapData {
    pub orders: Vec<HeatmapOrder>,
}

impl LiquidityHeatmapData {
    pub fn new(orders: Vec<HeatmapOrder>) -> Self { Self { orders } }

    /// One bid and one ask order per snapshot.
    pub fn from_snapshots(snapshots: &[OrderBookSnapshot]) -> Self {
        let orders = snapshots
            .iter()
            .flat_map(|s| {
                [
                    HeatmapOrder { price: s.bid, volume: s.bid_volume, start_time: s.time, end_time: s.end_time, is_bid: true },
                    HeatmapOrder { price: s.ask, volume: s.ask_volume, start_time: s.time, end_time: s.end_time, is_bid: false },
                ]
            })
            .collect();
        Self { orders }
    }

    pub fn max_volume(&self) -> Option<f64> {
        self.orders.iter().map(|o| o.volume).filter(|v| v.is_finite()).reduce(f64::max)
    }

    pub fn price_bounds(&self) -> Option<AutoscaleInfo> {
        AutoscaleInfo::from_prices(self.orders.iter().map(|o| o.price))
    }
}

/// `volume / max_volume`, saturating at [`MAX_ORDER_ALPHA`]; zero for a non-positive batch max.
pub fn order_alpha(volume: f64, max_volume: f64) -> f32 {
    if max_volume.is_nan() || max_volume <= 0.0 {
        return 0.0;
    }
    let ratio = (volume / max_volume) as f32;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, MAX_ORDER_ALPHA)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeatmapOptions {
    pub bid_color: Rgba,
    pub ask_color: Rgba,
    pub line_height: f32,
}

impl HeatmapOptions {
    /// Bid/ask colors from the theme at the default line height.
    pub fn from_theme(theme: &Theme) -> Self {
        Self { bid_color: theme.heatmap_bid, ask_color: theme.heatmap_ask, line_height: HEATMAP_LINE_HEIGHT }
    }
}

impl Default for HeatmapOptions {
    fn default() -> Self { Self::from_theme(&Theme::dark()) }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatmapItem {
    pub y: Option<Coordinate>,
    pub start_x: Option<Coordinate>,
    pub end_x: Option<Coordinate>,
    pub alpha: f32,
    pub is_bid: bool,
}

#[derive(Clone, Debug, Default)]
pub struct HeatmapPaneView {
    pub items: Vec<HeatmapItem>,
    options: HeatmapOptions,
}

impl PaneView for HeatmapPaneView {
    fn renderer(&self) -> &dyn PaneRenderer { self }
}

impl PaneRenderer for HeatmapPaneView {
    fn draw(&self, target: &RenderTarget<'_>) {
        let half = self.options.line_height / 2.0;
        for item in &self.items {
            let (Some(y), Some(x1), Some(x2)) = (item.y, item.start_x, item.end_x) else { continue };
            let base = if item.is_bid { self.options.bid_color } else { self.options.ask_color };
            target.fill_spans(
                positions_box(x1, x2, target.horizontal_pixel_ratio),
                positions_box(y - half, y + half, target.vertical_pixel_ratio),
                base.with_alpha(item.alpha),
            );
        }
    }
}

pub struct LiquidityHeatmap {
    base: PrimitiveBase,
    data: LiquidityHeatmapData,
    options: HeatmapOptions,
    views: Vec<HeatmapPaneView>,
}

impl LiquidityHeatmap {
    pub fn new(data: LiquidityHeatmapData) -> Self {
        Self::with_options(data, HeatmapOptions::default())
    }

    pub fn with_options(data: LiquidityHeatmapData, options: HeatmapOptions) -> Self {
        Self { base: PrimitiveBase::new("liquidity-heatmap"), data, options, views: Vec::new() }
    }

    pub fn data(&self) -> &LiquidityHeatmapData { &self.data }

    pub fn set_data(&mut self, data: LiquidityHeatmapData) {
        debug!(orders = data.orders.len(), "heatmap data replaced");
        self.data = data;
        self.update_all_views();
        self.base.request_update();
    }

    pub fn view(&self) -> Option<&HeatmapPaneView> { self.views.first() }

    fn compute_view(&self) -> Option<HeatmapPaneView> {
        let chart = self.base.chart().ok()?;
        let series = self.base.series().ok()?;
        let max_vol = self.data.max_volume().unwrap_or(0.0);
        let items = self
            .data
            .orders
            .iter()
            .map(|o| HeatmapItem {
                y: series.price_to_coordinate(o.price),
                start_x: chart.time_to_coordinate(o.start_time),
                end_x: chart.time_to_coordinate(o.end_time),
                alpha: order_alpha(o.volume, max_vol),
                is_bid: o.is_bid,
            })
            .collect();
        Some(HeatmapPaneView { items, options: self.options })
    }
}

impl SeriesPrimitive for LiquidityHeatmap {
    fn base(&self) -> &PrimitiveBase { &self.base }
    fn base_mut(&mut self) -> &mut PrimitiveBase { &mut self.base }

    fn update_all_views(&mut self) {
        if !self.base.should_render() {
            self.views.clear();
            return;
        }
        self.views = self.compute_view().into_iter().collect();
    }

    fn pane_views(&self) -> Vec<&dyn PaneView> {
        self.views.iter().map(|v| v as &dyn PaneView).collect()
    }

    fn autoscale_info(&self) -> Option<AutoscaleInfo> { self.data.price_bounds() }
}
