// File: crates/chart-overlays/src/chart.rs
// Summary: Headless host chart + candlestick series and the Skia CPU raster rendering pipeline.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use anyhow::Result;
use skia_safe as skia;
use tracing::{debug, warn};

use crate::geometry::positions_box;
use crate::host::{
    ChartApi, EventHandler, MouseEventParams, PrimitiveHandle, SeriesApi, SeriesAttachedParameter, SubscriptionId,
};
use crate::primitive::RenderTarget;
use crate::scale::{Logical, PriceScale, TimeScale};
use crate::series::Candle;
use crate::theme::Theme;
use crate::types::{Coordinate, Insets, MediaPoint, Time, HEIGHT, WIDTH};
use crate::view::{autoscale_range, visible_price_range, AUTOSCALE_MARGIN};

#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    /// Surface size in media pixels.
    pub width: i32,
    pub height: i32,
    pub insets: Insets,
    /// Device pixel ratio; the bitmap is `width * pixel_ratio` wide.
    pub pixel_ratio: f32,
    pub theme: Theme,
    pub draw_grid: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            insets: Insets::default(),
            pixel_ratio: 1.0,
            theme: Theme::dark(),
            draw_grid: true,
        }
    }
}

type HandlerList = RefCell<Vec<(SubscriptionId, EventHandler)>>;

/// In-process host: owns the time scale, the series, pointer subscriptions and the frame renderer.
///
/// Attached primitives hold strong references back to the chart and their
/// series; call [`HeadlessChart::remove`] to break those cycles on teardown.
pub struct HeadlessChart {
    me: Weak<HeadlessChart>,
    options: Cell<RenderOptions>,
    needs_update: Cell<bool>,
    time_scale: Cell<TimeScale>,
    times: RefCell<Vec<Time>>,
    series: RefCell<Vec<Rc<CandlestickSeries>>>,
    click_handlers: HandlerList,
    move_handlers: HandlerList,
}

impl HeadlessChart {
    pub fn new(options: RenderOptions) -> Rc<Self> {
        Rc::new_cyclic(|me| {
            let pane_w = pane_size(&options).0;
            Self {
                me: me.clone(),
                options: Cell::new(options),
                needs_update: Cell::new(false),
                time_scale: Cell::new(TimeScale::fit(pane_w, 1)),
                times: RefCell::new(Vec::new()),
                series: RefCell::new(Vec::new()),
                click_handlers: RefCell::new(Vec::new()),
                move_handlers: RefCell::new(Vec::new()),
            }
        })
    }

    pub fn options(&self) -> RenderOptions { self.options.get() }

    pub fn time_scale(&self) -> TimeScale { self.time_scale.get() }

    /// Pane size in media pixels (surface minus insets).
    pub fn pane_size(&self) -> (f32, f32) { pane_size(&self.options.get()) }

    pub fn add_candlestick_series(&self) -> Rc<CandlestickSeries> {
        let (_, pane_h) = self.pane_size();
        let series = Rc::new_cyclic(|me| CandlestickSeries {
            me: me.clone(),
            chart: self.me.clone(),
            data: RefCell::new(Vec::new()),
            scale: Cell::new(PriceScale::new(pane_h, 0.0, 1.0)),
            primitives: RefCell::new(Vec::new()),
        });
        self.series.borrow_mut().push(Rc::clone(&series));
        series
    }

    pub fn set_theme(&self, theme: Theme) {
        let mut opts = self.options.get();
        opts.theme = theme;
        self.options.set(opts);
    }

    pub fn resize(&self, width: i32, height: i32) {
        let mut opts = self.options.get();
        opts.width = width;
        opts.height = height;
        self.options.set(opts);
        let mut ts = self.time_scale.get();
        ts.width_px = self.pane_size().0;
        self.time_scale.set(ts);
        self.invalidate();
    }

    /// Fit every loaded bar into the pane.
    pub fn fit_content(&self) {
        let bars = self.times.borrow().len();
        self.time_scale.set(TimeScale::fit(self.pane_size().0, bars));
        self.invalidate();
    }

    pub fn pan(&self, dx_px: f32) {
        let mut ts = self.time_scale.get();
        ts.pan_px(dx_px);
        self.time_scale.set(ts);
        self.invalidate();
    }

    pub fn zoom(&self, cursor_x: f32, factor: f32) {
        let mut ts = self.time_scale.get();
        ts.zoom_at(cursor_x, factor);
        self.time_scale.set(ts);
        self.invalidate();
    }

    /// Fractional bar position of `time`; interpolated between bars, `None` outside the data.
    pub fn logical_index(&self, time: Time) -> Option<Logical> {
        let times = self.times.borrow();
        match times.binary_search(&time) {
            Ok(i) => Some(i as f64),
            Err(i) if i == 0 || i == times.len() => None,
            Err(i) => {
                let (t0, t1) = (times[i - 1], times[i]);
                Some((i - 1) as f64 + (time - t0) as f64 / (t1 - t0) as f64)
            }
        }
    }

    /// Re-autoscale every series, then recompute every attached primitive's views.
    pub fn invalidate(&self) {
        self.needs_update.set(false);
        let series: Vec<_> = self.series.borrow().clone();
        for s in &series {
            s.autoscale(self);
        }
        for s in &series {
            s.update_all_views();
        }
    }

    pub fn dispatch_click(&self, point: MediaPoint) {
        let (w, h) = self.pane_size();
        if point.x < 0.0 || point.y < 0.0 || point.x > w || point.y > h {
            return;
        }
        let params = MouseEventParams { point: Some(point), time: self.coordinate_to_time(point.x) };
        dispatch(&self.click_handlers, &params);
    }

    /// `None` (or a point outside the pane) means the pointer left the pane.
    pub fn dispatch_crosshair_move(&self, point: Option<MediaPoint>) {
        let (w, h) = self.pane_size();
        let point = point.filter(|p| p.x >= 0.0 && p.y >= 0.0 && p.x <= w && p.y <= h);
        let params = MouseEventParams { point, time: point.and_then(|p| self.coordinate_to_time(p.x)) };
        dispatch(&self.move_handlers, &params);
    }

    pub fn click_subscriber_count(&self) -> usize { self.click_handlers.borrow().len() }

    pub fn move_subscriber_count(&self) -> usize { self.move_handlers.borrow().len() }

    /// Detach every primitive and drop every subscription.
    pub fn remove(&self) {
        let series: Vec<_> = self.series.borrow_mut().drain(..).collect();
        for s in &series {
            s.detach_all();
        }
        self.click_handlers.borrow_mut().clear();
        self.move_handlers.borrow_mut().clear();
        self.times.borrow_mut().clear();
    }

    fn rebuild_times(&self) {
        let mut times: Vec<Time> = Vec::new();
        for s in self.series.borrow().iter() {
            times.extend(s.data.borrow().iter().map(|c| c.time));
        }
        times.sort_unstable();
        times.dedup();
        *self.times.borrow_mut() = times;
    }

    /// Paint one frame: background, grid, candles, then primitives in attach order.
    pub fn render(&self, canvas: &skia::Canvas) {
        if self.needs_update.get() {
            self.invalidate();
        }
        let opts = self.options.get();
        let ratio = opts.pixel_ratio;
        canvas.clear(opts.theme.background.to_skia());

        let (pane_w, pane_h) = self.pane_size();
        let bw = (pane_w * ratio).round() as i32;
        let bh = (pane_h * ratio).round() as i32;

        canvas.save();
        canvas.translate((opts.insets.left as f32 * ratio, opts.insets.top as f32 * ratio));
        canvas.clip_rect(skia::Rect::from_wh(bw as f32, bh as f32), skia::ClipOp::Intersect, false);

        if opts.draw_grid {
            draw_grid(canvas, bw, bh, &opts.theme);
        }
        let target = RenderTarget::new(canvas, ratio, bw, bh);
        let series: Vec<_> = self.series.borrow().clone();
        for s in &series {
            s.draw_candles(self, &target, &opts.theme);
            s.draw_primitives(&target);
        }
        canvas.restore();
    }

    /// Render the chart to PNG bytes using a CPU raster surface.
    pub fn render_to_png_bytes(&self) -> Result<Vec<u8>> {
        let opts = self.options.get();
        let w = ((opts.width as f32) * opts.pixel_ratio).round() as i32;
        let h = ((opts.height as f32) * opts.pixel_ratio).round() as i32;
        let mut surface = skia::surfaces::raster_n32_premul((w.max(1), h.max(1)))
            .ok_or_else(|| anyhow::anyhow!("failed to create raster surface"))?;
        self.render(surface.canvas());

        let image = surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| anyhow::anyhow!("encode PNG failed"))?;
        Ok(data.as_bytes().to_vec())
    }

    /// Render the chart to a PNG at `output_png_path`.
    pub fn render_to_png(&self, output_png_path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.render_to_png_bytes()?;
        if let Some(parent) = output_png_path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(output_png_path, bytes)?;
        Ok(())
    }
}

impl ChartApi for HeadlessChart {
    fn time_to_coordinate(&self, time: Time) -> Option<Coordinate> {
        let ts = self.time_scale.get();
        self.logical_index(time).map(|i| ts.to_px(i)).filter(|x| x.is_finite())
    }

    fn coordinate_to_time(&self, x: Coordinate) -> Option<Time> {
        if !x.is_finite() {
            return None;
        }
        let idx = self.time_scale.get().from_px(x).round();
        let times = self.times.borrow();
        if idx < 0.0 || idx >= times.len() as f64 {
            return None;
        }
        times.get(idx as usize).copied()
    }

    fn time_scale_width(&self) -> Coordinate { self.time_scale.get().width_px }

    fn request_update(&self) { self.needs_update.set(true); }

    fn subscribe_click(&self, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.click_handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe_click(&self, id: SubscriptionId) {
        self.click_handlers.borrow_mut().retain(|(h, _)| *h != id);
    }

    fn subscribe_crosshair_move(&self, handler: EventHandler) -> SubscriptionId {
        let id = SubscriptionId::next();
        self.move_handlers.borrow_mut().push((id, handler));
        id
    }

    fn unsubscribe_crosshair_move(&self, id: SubscriptionId) {
        self.move_handlers.borrow_mut().retain(|(h, _)| *h != id);
    }
}

/// Candlestick series with its own price scale and primitive registry.
pub struct CandlestickSeries {
    me: Weak<CandlestickSeries>,
    chart: Weak<HeadlessChart>,
    data: RefCell<Vec<Candle>>,
    scale: Cell<PriceScale>,
    primitives: RefCell<Vec<PrimitiveHandle>>,
}

impl CandlestickSeries {
    /// Replace the data (sorted by time, one candle per time) and refit the time scale.
    pub fn set_data(&self, mut candles: Vec<Candle>) {
        candles.sort_by_key(|c| c.time);
        candles.dedup_by_key(|c| c.time);
        debug!(bars = candles.len(), "series data replaced");
        *self.data.borrow_mut() = candles;
        if let Some(chart) = self.chart.upgrade() {
            chart.rebuild_times();
            chart.fit_content();
        }
    }

    /// Append a candle, or replace the last one when the time matches.
    pub fn update(&self, candle: Candle) {
        {
            let mut data = self.data.borrow_mut();
            match data.last_mut() {
                Some(last) if last.time == candle.time => *last = candle,
                Some(last) if last.time > candle.time => {
                    warn!(time = candle.time, "ignoring out-of-order candle update");
                    return;
                }
                _ => data.push(candle),
            }
        }
        if let Some(chart) = self.chart.upgrade() {
            chart.rebuild_times();
            chart.invalidate();
        }
    }

    pub fn data(&self) -> Vec<Candle> { self.data.borrow().clone() }

    pub fn price_scale(&self) -> PriceScale { self.scale.get() }

    pub fn primitives(&self) -> Vec<PrimitiveHandle> { self.primitives.borrow().clone() }

    pub fn primitive_count(&self) -> usize { self.primitives.borrow().len() }

    fn autoscale(&self, chart: &HeadlessChart) {
        let (_, pane_h) = chart.pane_size();
        let (first, last) = chart.time_scale.get().visible_logical_range();
        let candles = visible_price_range(&self.data.borrow(), first, last, |c| chart.logical_index(c.time));
        let overlays: Vec<_> = self
            .primitives
            .borrow()
            .iter()
            .filter_map(|p| p.try_borrow().ok().filter(|p| p.base().should_render()).and_then(|p| p.autoscale_info()))
            .collect();
        let current = self.scale.get();
        let scale = match autoscale_range(candles, overlays, AUTOSCALE_MARGIN) {
            Some((lo, hi)) => PriceScale::new(pane_h, lo, hi),
            None => PriceScale::new(pane_h, current.vmin, current.vmax),
        };
        self.scale.set(scale);
    }

    fn update_all_views(&self) {
        for p in self.primitives() {
            match p.try_borrow_mut() {
                Ok(mut p) => p.update_all_views(),
                Err(_) => warn!("primitive busy during view update; skipped"),
            };
        }
    }

    fn detach_all(&self) {
        let list: Vec<_> = self.primitives.borrow_mut().drain(..).collect();
        for p in list {
            if let Ok(mut p) = p.try_borrow_mut() {
                p.detached();
            }
        }
    }

    fn draw_candles(&self, chart: &HeadlessChart, target: &RenderTarget<'_>, theme: &Theme) {
        let ts = chart.time_scale.get();
        let scale = self.scale.get();
        let hr = target.horizontal_pixel_ratio;
        let vr = target.vertical_pixel_ratio;

        let half_body = (ts.bar_spacing * 0.35).max(0.5);
        for c in self.data.borrow().iter() {
            let Some(idx) = chart.logical_index(c.time) else { continue };
            let x = ts.to_px(idx);
            if x < -ts.bar_spacing || x > ts.width_px + ts.bar_spacing {
                continue;
            }
            let (body, wick) = if c.is_up() {
                (theme.candle_up, theme.wick_up)
            } else {
                (theme.candle_down, theme.wick_down)
            };
            target.fill_spans(
                positions_box(x, x, hr),
                positions_box(scale.to_px(c.high), scale.to_px(c.low), vr),
                wick,
            );
            target.fill_spans(
                positions_box(x - half_body, x + half_body, hr),
                positions_box(scale.to_px(c.open), scale.to_px(c.close), vr),
                body,
            );
        }
    }

    fn draw_primitives(&self, target: &RenderTarget<'_>) {
        for p in self.primitives() {
            match p.try_borrow() {
                Ok(p) => {
                    if let Err(err) = p.draw(target) {
                        warn!(%err, "primitive draw skipped");
                    }
                }
                Err(_) => warn!("primitive busy during draw; skipped"),
            }
        }
    }
}

impl SeriesApi for CandlestickSeries {
    fn price_to_coordinate(&self, price: f64) -> Option<Coordinate> {
        if !price.is_finite() || self.data.borrow().is_empty() {
            return None;
        }
        Some(self.scale.get().to_px(price)).filter(|y| y.is_finite())
    }

    fn coordinate_to_price(&self, y: Coordinate) -> Option<f64> {
        if !y.is_finite() || self.data.borrow().is_empty() {
            return None;
        }
        Some(self.scale.get().from_px(y)).filter(|p| p.is_finite())
    }

    fn bar_at(&self, time: Time) -> Option<Candle> {
        let data = self.data.borrow();
        data.binary_search_by_key(&time, |c| c.time).ok().map(|i| data[i])
    }

    fn attach_primitive(&self, primitive: PrimitiveHandle) {
        let (Some(chart), Some(me)) = (self.chart.upgrade(), self.me.upgrade()) else {
            warn!("attach on a series whose chart was dropped; ignored");
            return;
        };
        if self.primitives.borrow().iter().any(|p| Rc::ptr_eq(p, &primitive)) {
            return;
        }
        self.primitives.borrow_mut().push(Rc::clone(&primitive));
        let param = SeriesAttachedParameter {
            chart: Rc::clone(&chart) as Rc<dyn ChartApi>,
            series: me as Rc<dyn SeriesApi>,
        };
        primitive.borrow_mut().attached(param);
        chart.invalidate();
    }

    fn detach_primitive(&self, primitive: &PrimitiveHandle) {
        let removed = {
            let mut list = self.primitives.borrow_mut();
            let before = list.len();
            list.retain(|p| !Rc::ptr_eq(p, primitive));
            before != list.len()
        };
        if !removed {
            return;
        }
        match primitive.try_borrow_mut() {
            Ok(mut p) => p.detached(),
            Err(_) => warn!("primitive busy during detach; lifecycle hook skipped"),
        }
        if let Some(chart) = self.chart.upgrade() {
            chart.invalidate();
        }
    }
}

// ---- helpers ----------------------------------------------------------------

fn pane_size(opts: &RenderOptions) -> (f32, f32) {
    let w = (opts.width - opts.insets.hsum() as i32).max(1);
    let h = (opts.height - opts.insets.vsum() as i32).max(1);
    (w as f32, h as f32)
}

fn dispatch(handlers: &HandlerList, params: &MouseEventParams) {
    // handlers may (un)subscribe while running
    let snapshot: Vec<EventHandler> = handlers.borrow().iter().map(|(_, h)| Rc::clone(h)).collect();
    for handler in snapshot {
        handler(params);
    }
}

fn draw_grid(canvas: &skia::Canvas, bw: i32, bh: i32, theme: &Theme) {
    let mut paint = skia::Paint::default();
    paint.set_color(theme.grid.to_skia());
    paint.set_stroke_width(1.0);

    const COLS: i32 = 10;
    const ROWS: i32 = 6;
    for i in 1..COLS {
        let x = (bw * i / COLS) as f32 + 0.5;
        canvas.draw_line((x, 0.0), (x, bh as f32), &paint);
    }
    for j in 1..ROWS {
        let y = (bh * j / ROWS) as f32 + 0.5;
        canvas.draw_line((0.0, y), (bw as f32, y), &paint);
    }
}
