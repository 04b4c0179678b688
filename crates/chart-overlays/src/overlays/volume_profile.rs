// File: crates/chart-overlays/src/overlays/volume_profile.rs
// Summary: Volume-by-price histogram anchored to the right edge of the plotted time range.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::positions_box;
use crate::primitive::{AutoscaleInfo, PaneRenderer, PaneView, PrimitiveBase, RenderTarget, SeriesPrimitive};
use crate::series::Candle;
use crate::theme::{Rgba, Theme};
use crate::types::Coordinate;

/// Default pixel width of the widest bar.
pub const DEFAULT_PROFILE_WIDTH: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfileBucket {
    pub price: f64,
    /// Relative magnitude, not an absolute unit.
    pub vol: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfileData {
    pub profile: Vec<VolumeProfileBucket>,
    /// Pixel width of the widest bar.
    pub width: f32,
}

impl VolumeProfileData {
    pub fn new(profile: Vec<VolumeProfileBucket>, width: f32) -> Self {
        Self { profile, width }
    }

    /// Aggregate candle volume into `buckets` equal price bins spanning `[min low, max high]`.
    ///
    /// Each candle's volume is spread uniformly over its own `[low, high]`; a
    /// candle with no range puts everything into the bin holding its price.
    /// Bucket prices are bin centres.
    pub fn from_candles(candles: &[Candle], buckets: usize, width: f32) -> Self {
        let empty = Self::new(Vec::new(), width);
        if buckets == 0 {
            return empty;
        }
        let Some(range) = AutoscaleInfo::from_prices(candles.iter().flat_map(|c| [c.low, c.high])) else {
            return empty;
        };
        let lo = range.min_value;
        let span = range.max_value - lo;
        let step = if span > 0.0 { span / buckets as f64 } else { 1.0 };

        let bin_of = |price: f64| (((price - lo) / step).floor().max(0.0) as usize).min(buckets - 1);
        let mut vols = vec![0.0_f64; buckets];
        for c in candles.iter().filter(|c| c.volume > 0.0 && c.low.is_finite() && c.high.is_finite()) {
            let range = c.high - c.low;
            if range <= 0.0 {
                vols[bin_of(c.low)] += c.volume;
                continue;
            }
            let (first, last) = (bin_of(c.low), bin_of(c.high));
            for (i, vol) in vols.iter_mut().enumerate().take(last + 1).skip(first) {
                let bin_lo = lo + step * i as f64;
                let overlap = (c.high.min(bin_lo + step) - c.low.max(bin_lo)).max(0.0);
                *vol += c.volume * overlap / range;
            }
        }

        let profile = vols
            .into_iter()
            .enumerate()
            .map(|(i, vol)| VolumeProfileBucket { price: lo + step * (i as f64 + 0.5), vol })
            .collect();
        Self::new(profile, width)
    }

    pub fn max_volume(&self) -> Option<f64> {
        self.profile.iter().map(|b| b.vol).filter(|v| v.is_finite()).reduce(f64::max)
    }

    /// Lowest and highest bucket price.
    pub fn price_bounds(&self) -> Option<AutoscaleInfo> {
        AutoscaleInfo::from_prices(self.profile.iter().map(|b| b.price))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeProfileOptions {
    pub color: Rgba,
}

impl VolumeProfileOptions {
    pub fn from_theme(theme: &Theme) -> Self {
        Self { color: theme.volume_profile }
    }
}

impl Default for VolumeProfileOptions {
    fn default() -> Self { Self::from_theme(&Theme::dark()) }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeProfileItem {
    pub y: Option<Coordinate>,
    pub width: f32,
}

/// Pixel geometry of one profile; also its own renderer.
#[derive(Clone, Debug, Default)]
pub struct VolumeProfilePaneView {
    pub x: Option<Coordinate>,
    pub top: Option<Coordinate>,
    pub column_height: f32,
    pub items: Vec<VolumeProfileItem>,
    color: Option<Rgba>,
}

impl PaneView for VolumeProfilePaneView {
    fn renderer(&self) -> &dyn PaneRenderer { self }
}

impl PaneRenderer for VolumeProfilePaneView {
    fn draw(&self, target: &RenderTarget<'_>) {
        let (Some(x), Some(_), Some(color)) = (self.x, self.top, self.color) else { return };
        if self.column_height <= 0.0 {
            return;
        }
        for item in &self.items {
            let Some(y) = item.y else { continue };
            let v = positions_box(y, y - self.column_height, target.vertical_pixel_ratio);
            let h = positions_box(x - item.width, x, target.horizontal_pixel_ratio);
            target.fill_spans(h, v, color);
        }
    }
}

pub struct VolumeProfile {
    base: PrimitiveBase,
    data: VolumeProfileData,
    options: VolumeProfileOptions,
    views: Vec<VolumeProfilePaneView>,
}

impl VolumeProfile {
    pub fn new(data: VolumeProfileData) -> Self {
        Self::with_options(data, VolumeProfileOptions::default())
    }

    pub fn with_options(data: VolumeProfileData, options: VolumeProfileOptions) -> Self {
        Self { base: PrimitiveBase::new("volume-profile"), data, options, views: Vec::new() }
    }

    pub fn data(&self) -> &VolumeProfileData { &self.data }

    /// Replace the profile and recompute the views.
    pub fn set_data(&mut self, data: VolumeProfileData) {
        debug!(buckets = data.profile.len(), "volume profile data replaced");
        self.data = data;
        self.update_all_views();
        self.base.request_update();
    }

    /// Current geometry; `None` until attached and visible.
    pub fn view(&self) -> Option<&VolumeProfilePaneView> { self.views.first() }

    fn compute_view(&self) -> Option<VolumeProfilePaneView> {
        let chart = self.base.chart().ok()?;
        let series = self.base.series().ok()?;
        let profile = &self.data.profile;
        if profile.is_empty() {
            return Some(VolumeProfilePaneView::default());
        }

        // bucket spacing is taken as uniform
        let column_height = match profile {
            [a, b, ..] => match (series.price_to_coordinate(a.price), series.price_to_coordinate(b.price)) {
                (Some(y0), Some(y1)) => (y0 - y1).abs(),
                _ => 0.0,
            },
            _ => 0.0,
        };

        let max_vol = self.data.max_volume().unwrap_or(0.0);
        let width = self.data.width;
        let items = profile
            .iter()
            .map(|b| VolumeProfileItem {
                y: series.price_to_coordinate(b.price),
                width: if max_vol > 0.0 { (width * (b.vol / max_vol) as f32).max(1.0) } else { 1.0 },
            })
            .collect();
        let top = self.data.price_bounds().and_then(|r| series.price_to_coordinate(r.max_value));

        Some(VolumeProfilePaneView {
            x: Some(chart.time_scale_width()),
            top,
            column_height,
            items,
            color: Some(self.options.color),
        })
    }
}

impl SeriesPrimitive for VolumeProfile {
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
