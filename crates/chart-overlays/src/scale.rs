// File: crates/chart-overlays/src/scale.rs
// Summary: Time (X) and price (Y) scale transforms with zoom/pan on the time axis, in pane-relative media pixels.

/// Logical X coordinate: fractional bar index.
pub type Logical = f64;

/// Horizontal time scale controlled via logical start and bar spacing (px per bar).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    pub width_px: f32,
    pub start_logical: Logical,
    pub bar_spacing: f32,
}

impl TimeScale {
    pub const MIN_SPACING: f32 = 0.5;
    pub const MAX_SPACING: f32 = 200.0;

    pub fn new(width_px: f32, start_logical: Logical, bar_spacing: f32) -> Self {
        Self {
            width_px: width_px.max(1.0),
            start_logical,
            bar_spacing: bar_spacing.clamp(Self::MIN_SPACING, Self::MAX_SPACING),
        }
    }

    /// Spread `bars` evenly over the pane, half a bar of margin on each side.
    pub fn fit(width_px: f32, bars: usize) -> Self {
        let n = bars.max(1) as f32;
        Self::new(width_px, -0.5, width_px.max(1.0) / n)
    }

    #[inline]
    pub fn to_px(&self, x: Logical) -> f32 {
        ((x - self.start_logical) as f32) * self.bar_spacing
    }

    #[inline]
    pub fn from_px(&self, px: f32) -> Logical {
        self.start_logical + (px / self.bar_spacing) as f64
    }

    /// Logical range currently inside the pane.
    pub fn visible_logical_range(&self) -> (Logical, Logical) {
        (self.start_logical, self.from_px(self.width_px))
    }

    pub fn zoom_at(&mut self, cursor_px: f32, factor: f32) {
        let cx = self.from_px(cursor_px);
        self.bar_spacing = (self.bar_spacing * factor).clamp(Self::MIN_SPACING, Self::MAX_SPACING);
        // keep cx under the cursor
        self.start_logical = cx - (cursor_px / self.bar_spacing) as f64;
    }

    pub fn pan_px(&mut self, dx_px: f32) {
        self.start_logical -= (dx_px / self.bar_spacing) as f64;
    }
}

/// Vertical price scale mapping [vmin, vmax] onto [height, 0] pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceScale {
    pub height_px: f32,
    pub vmin: f64,
    pub vmax: f64,
}

impl PriceScale {
    pub fn new(height_px: f32, vmin: f64, vmax: f64) -> Self {
        let mut s = Self { height_px: height_px.max(1.0), vmin, vmax };
        if (s.vmax - s.vmin).abs() < 1e-12 { s.vmax = s.vmin + 1.0; }
        s
    }

    #[inline]
    pub fn to_px(&self, price: f64) -> f32 {
        let span = (self.vmax - self.vmin).max(1e-12);
        self.height_px - ((price - self.vmin) / span) as f32 * self.height_px
    }

    #[inline]
    pub fn from_px(&self, py: f32) -> f64 {
        let span = (self.vmax - self.vmin).max(1e-12);
        self.vmin + ((self.height_px - py) / self.height_px) as f64 * span
    }
}
