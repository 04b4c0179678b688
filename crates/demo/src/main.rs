// File: crates/demo/src/main.rs
// Summary: Demo loads OHLCV CSV (or synthesizes candles), adds heatmap, volume profile and
// scripted drawings, then renders the chart to a PNG.
// Usage: chart-overlays-demo [candles.csv] [config.json]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use chart_overlays::overlays::VerticalLineOptions;
use chart_overlays::{
    AnnotationStore, Candle, CandlestickSeries, ChartApi, DrawingToolType, FileStorage, HeadlessChart,
    LiquidityHeatmap, LiquidityHeatmapData, MediaPoint, OrderBookSnapshot, OverlayConfig, PrimitiveHandle, RenderOptions,
    SeriesApi, Time, Toolbox, VerticalLine, VolumeProfile, VolumeProfileData,
};
use chrono::{DateTime, NaiveDateTime};
use tracing::{info, warn};

fn main() -> Result<()> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let input = args.next();
    let config = match args.next() {
        Some(path) => OverlayConfig::from_json_file(&path).with_context(|| format!("loading config '{path}'"))?,
        None => OverlayConfig::default(),
    };

    let (candles, stem) = match input {
        Some(raw) => {
            let (path, used_alt) = resolve_path(&raw)?;
            if used_alt {
                info!(path = %path.display(), "extension swapped between .csv/.cvs");
            }
            let candles = load_ohlcv_csv(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?;
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("chart").to_string();
            (candles, stem)
        }
        None => (synthetic_candles(240), "synthetic".to_string()),
    };
    if candles.is_empty() {
        anyhow::bail!("no candles loaded; check headers/delimiter");
    }
    info!(count = candles.len(), "candles loaded");

    let chart = HeadlessChart::new(RenderOptions { theme: config.theme(), ..RenderOptions::default() });
    let series = chart.add_candlestick_series();
    series.set_data(candles.clone());

    let heatmap = LiquidityHeatmap::with_options(
        LiquidityHeatmapData::from_snapshots(&book_snapshots(&candles, 12)),
        config.heatmap,
    );
    attach(&series, heatmap);

    let profile = VolumeProfileData::from_candles(&candles, config.profile_buckets, config.profile_width);
    attach(&series, VolumeProfile::with_options(profile, config.volume_profile));

    if let Some(last) = candles.last() {
        attach(&series, VerticalLine::new(last.time, VerticalLineOptions::default()));
    }

    let store_dir = PathBuf::from("target/out/store");
    let store = Rc::new(AnnotationStore::load(FileStorage::new(&store_dir))?);
    let chart_api: Rc<dyn ChartApi> = chart.clone();
    let series_api: Rc<dyn SeriesApi> = series.clone();
    let toolbox = Toolbox::new(chart_api, series_api, Rc::clone(&store), &config);
    info!(restored = store.len(), dir = %store_dir.display(), "annotation store opened");

    if store.is_empty() {
        script_drawings(&chart, &series, &toolbox, &candles);
    } else {
        info!(restored = store.len(), "drawings restored; scripted clicks skipped");
    }
    hover_last_bar(&chart, &series, &toolbox, &candles);

    let out = PathBuf::from("target/out").join(format!("overlays_{stem}.png"));
    chart.render_to_png(&out)?;
    info!(path = %out.display(), drawings = store.len(), "chart written");

    toolbox.remove();
    chart.remove();
    Ok(())
}

// Initialise an INFO `Subscriber` for `Tracing` logs
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(cfg!(debug_assertions))
        .init()
}

fn attach(series: &CandlestickSeries, primitive: impl chart_overlays::SeriesPrimitive + 'static) {
    let handle: PrimitiveHandle = Rc::new(RefCell::new(primitive));
    series.attach_primitive(handle);
}

fn media_point(chart: &HeadlessChart, series: &CandlestickSeries, time: Time, price: f64) -> Option<MediaPoint> {
    let x = chart.time_to_coordinate(time)?;
    let y = series.price_to_coordinate(price)?;
    Some(MediaPoint::new(x, y))
}

/// Click a rectangle around the middle third and a trend line across the whole range.
/// Clicks landing on an existing shape never delete it.
fn script_drawings(chart: &HeadlessChart, series: &CandlestickSeries, toolbox: &Toolbox, candles: &[Candle]) {
    toolbox.rectangle().set_confirm(|_| false);
    toolbox.trend_line().set_confirm(|_| false);

    let n = candles.len();
    let at = |i: usize, price: f64| media_point(chart, series, candles[i].time, price);
    let (lo, hi) = candles.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| (lo.min(c.low), hi.max(c.high)));
    let mid = (lo + hi) / 2.0;
    let span = (hi - lo) / 6.0;

    let steps: [(DrawingToolType, [Option<MediaPoint>; 2]); 2] = [
        (DrawingToolType::Rectangle, [at(n / 3, mid + span), at(2 * n / 3, mid - span)]),
        (DrawingToolType::TrendLine, [at(0, candles[0].close), at(n - 1, candles[n - 1].close)]),
    ];
    for (tool, clicks) in steps {
        toolbox.select(tool);
        for point in clicks {
            match point {
                Some(p) => chart.dispatch_click(p),
                None => warn!(?tool, "scripted click off the scales; skipped"),
            }
        }
    }
}

/// Leave the delta tooltip hovering the last bar.
fn hover_last_bar(chart: &HeadlessChart, series: &CandlestickSeries, toolbox: &Toolbox, candles: &[Candle]) {
    let Some(last) = candles.last() else { return };
    toolbox.select(DrawingToolType::Delta);
    chart.dispatch_crosshair_move(media_point(chart, series, last.time, last.close));
}

/// Top-of-book guesses from bar extremes, one snapshot per `every` bars.
fn book_snapshots(candles: &[Candle], every: usize) -> Vec<OrderBookSnapshot> {
    candles
        .chunks(every.max(1))
        .filter_map(|chunk| {
            let (first, last) = (chunk.first()?, chunk.last()?);
            let low = chunk.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let high = chunk.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
            let volume: f64 = chunk.iter().map(|c| c.volume).sum();
            Some(OrderBookSnapshot {
                time: first.time,
                end_time: last.time,
                bid: low,
                ask: high,
                bid_volume: volume * 0.6,
                ask_volume: volume * 0.4,
            })
        })
        .collect()
}

fn synthetic_candles(n: usize) -> Vec<Candle> {
    let t0: Time = 1_700_000_000;
    let mut close = 100.0_f64;
    (0..n)
        .map(|i| {
            let open = close;
            close = open + (i as f64 * 0.15).sin() * 1.2 + 0.05;
            Candle {
                time: t0 + i as Time * 3600,
                open,
                high: open.max(close) + 0.6,
                low: open.min(close) - 0.6,
                close,
                volume: 50.0 + (i as f64 * 0.3).cos().abs() * 150.0,
            }
        })
        .collect()
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

/// Load Binance-like OHLCV CSV; rows without a parseable time or price are skipped.
fn load_ohlcv_csv(path: &Path) -> Result<Vec<Candle>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect::<Vec<_>>();
    info!(?headers, "csv headers");
    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));

    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]);
    let i_open = idx(&["open", "o"]);
    let i_high = idx(&["high", "h"]);
    let i_low = idx(&["low", "l"]);
    let i_close = idx(&["close", "c", "adj_close", "close_price"]);
    let i_volume = idx(&["volume", "vol", "v"]);
    if i_time.is_none() {
        anyhow::bail!("no time column in {}", path.display());
    }

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let field = |i: Option<usize>| i.and_then(|ix| rec.get(ix)).map(str::trim);
        let num = |i: Option<usize>| field(i).and_then(|s| s.parse::<f64>().ok());
        let time = field(i_time).and_then(parse_time);
        match (time, num(i_open), num(i_high), num(i_low), num(i_close)) {
            (Some(time), Some(open), Some(high), Some(low), Some(close)) => {
                let volume = num(i_volume).unwrap_or(0.0);
                match Candle::try_new(time, open, high, low, close, volume) {
                    Ok(c) => out.push(c),
                    Err(_) => skipped += 1,
                }
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, "csv rows skipped");
    }
    Ok(out)
}

/// Epoch seconds or milliseconds, RFC 3339, or `YYYY-MM-DD HH:MM:SS` (UTC).
fn parse_time(s: &str) -> Option<Time> {
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        // epoch ms -> sec
        return Some(if n > 10_i64.pow(12) { n / 1000 } else { n });
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.timestamp());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok().map(|t| t.and_utc().timestamp())
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => {
            alt.set_extension("csv");
            Some(alt)
        }
        "csv" => {
            alt.set_extension("cvs");
            Some(alt)
        }
        _ => None,
    }
}
