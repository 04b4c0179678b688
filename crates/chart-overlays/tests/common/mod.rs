// File: crates/chart-overlays/tests/common/mod.rs
// Purpose: Deterministic candles and chart fixtures shared by the integration tests.
#![allow(dead_code)]

use std::rc::Rc;

use chart_overlays::{
    CandlestickSeries, ChartApi, HeadlessChart, MediaPoint, MouseEventParams, RenderOptions, SeriesApi, Time,
};
use chart_overlays::Candle;

pub const T0: Time = 1_700_000_000;
pub const STEP: Time = 60;

pub fn t(i: i64) -> Time { T0 + i * STEP }

/// Gently rising zig-zag around 100 with growing volume.
pub fn candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let open = 100.0 + i as f64;
            let close = if i % 2 == 0 { open + 1.0 } else { open - 1.0 };
            Candle {
                time: t(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 10.0 + i as f64,
            }
        })
        .collect()
}

pub fn chart_with_candles(n: usize) -> (Rc<HeadlessChart>, Rc<CandlestickSeries>) {
    chart_with(RenderOptions::default(), n)
}

pub fn chart_with(options: RenderOptions, n: usize) -> (Rc<HeadlessChart>, Rc<CandlestickSeries>) {
    let chart = HeadlessChart::new(options);
    let series = chart.add_candlestick_series();
    series.set_data(candles(n));
    (chart, series)
}

pub fn media(chart: &HeadlessChart, series: &CandlestickSeries, time: Time, price: f64) -> MediaPoint {
    let x = chart.time_to_coordinate(time).expect("time on the scale");
    let y = series.price_to_coordinate(price).expect("price on the scale");
    MediaPoint::new(x, y)
}

pub fn click(chart: &HeadlessChart, series: &CandlestickSeries, time: Time, price: f64) {
    chart.dispatch_click(media(chart, series, time, price));
}

pub fn hover(chart: &HeadlessChart, series: &CandlestickSeries, time: Time, price: f64) {
    chart.dispatch_crosshair_move(Some(media(chart, series, time, price)));
}

pub fn params_at(point: MediaPoint, time: Time) -> MouseEventParams {
    MouseEventParams { point: Some(point), time: Some(time) }
}

pub fn approx(a: f64, b: f64, tol: f64) -> bool { (a - b).abs() <= tol }
