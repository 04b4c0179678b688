// File: crates/chart-overlays/tests/render.rs
// Purpose: Raster output of the headless chart with overlays.
// Behavior:
// - Frames are decoded back to RGBA and sampled at pixels away from candles and grid.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use chart_overlays::{
    LiquidityHeatmap, LiquidityHeatmapData, OrderBookSnapshot, Point, PrimitiveHandle, RectangleDrawingTool,
    RenderOptions, Rgba, SeriesApi, ShapeStyle, VolumeProfile, VolumeProfileData,
};
use image::RgbaImage;

fn quiet() -> RenderOptions {
    RenderOptions { draw_grid: false, ..RenderOptions::default() }
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes).expect("decode png").to_rgba8()
}

fn column(img: &RgbaImage, x: u32) -> Vec<[u8; 4]> {
    (0..img.height()).map(|y| img.get_pixel(x, y).0).collect()
}

#[test]
fn frame_matches_surface_size_and_ratio() {
    let (chart, _series) = common::chart_with_candles(20);
    let img = decode(&chart.render_to_png_bytes().expect("render"));
    assert_eq!(img.dimensions(), (1024, 640));

    let (hidpi, _series) = common::chart_with(RenderOptions { pixel_ratio: 2.0, ..RenderOptions::default() }, 20);
    let img = decode(&hidpi.render_to_png_bytes().expect("render"));
    assert_eq!(img.dimensions(), (2048, 1280));
}

#[test]
fn background_uses_the_theme() {
    let (chart, _series) = common::chart_with(quiet(), 20);
    let img = decode(&chart.render_to_png_bytes().expect("render"));
    assert_eq!(img.get_pixel(1, 1).0, [0x11, 0x11, 0x13, 0xff]);
}

#[test]
fn volume_profile_paints_at_the_right_edge() {
    let (chart, series) = common::chart_with(quiet(), 20);
    let before = decode(&chart.render_to_png_bytes().expect("render"));

    let data = VolumeProfileData::from_candles(&series.data(), 10, 60.0);
    let handle: PrimitiveHandle = Rc::new(RefCell::new(VolumeProfile::new(data)));
    series.attach_primitive(handle);
    let after = decode(&chart.render_to_png_bytes().expect("render"));

    let left = chart.options().insets.left;
    let x = left + chart.pane_size().0 as u32 - 2;
    assert_ne!(column(&before, x), column(&after, x));
    // beyond the widest bar nothing changes
    assert_eq!(column(&before, x - 70), column(&after, x - 70));
}

#[test]
fn heatmap_paints_order_lines() {
    let (chart, series) = common::chart_with(quiet(), 20);
    let before = decode(&chart.render_to_png_bytes().expect("render"));

    let snapshot = OrderBookSnapshot {
        time: common::t(2),
        end_time: common::t(15),
        bid: 105.0,
        ask: 112.0,
        bid_volume: 40.0,
        ask_volume: 80.0,
    };
    let data = LiquidityHeatmapData::from_snapshots(&[snapshot]);
    let handle: PrimitiveHandle = Rc::new(RefCell::new(LiquidityHeatmap::new(data)));
    series.attach_primitive(handle);
    let after = decode(&chart.render_to_png_bytes().expect("render"));
    assert_ne!(before.as_raw(), after.as_raw());
}

#[test]
fn degenerate_rectangle_paints_nothing() {
    let (chart, series) = common::chart_with(quiet(), 20);
    let before = decode(&chart.render_to_png_bytes().expect("render"));

    let tool = RectangleDrawingTool::new(chart.clone(), series.clone());
    let p = Point::new(common::t(3), 104.0);
    tool.restore([p, p], ShapeStyle::new(Rgba::opaque(255, 0, 0), 1.0, 2.0));
    assert_eq!(series.primitive_count(), 1);
    let after = decode(&chart.render_to_png_bytes().expect("render"));
    assert_eq!(before.as_raw(), after.as_raw());
}

#[test]
fn render_to_png_writes_a_file() {
    let (chart, _series) = common::chart_with_candles(30);
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/test_out/render_smoke.png");
    chart.render_to_png(&path).expect("render to file");
    let img = image::open(&path).expect("open written png").to_rgba8();
    assert_eq!(img.dimensions(), (1024, 640));
}
