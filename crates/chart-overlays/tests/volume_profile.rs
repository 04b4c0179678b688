// File: crates/chart-overlays/tests/volume_profile.rs
// Purpose: Volume profile aggregation, bar scaling and degenerate inputs.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use chart_overlays::{
    Candle, ChartApi, SeriesApi, SeriesPrimitive, VolumeProfile, VolumeProfileBucket, VolumeProfileData,
};

fn bucket(price: f64, vol: f64) -> VolumeProfileBucket { VolumeProfileBucket { price, vol } }

fn attached(data: VolumeProfileData) -> (Rc<chart_overlays::HeadlessChart>, Rc<chart_overlays::CandlestickSeries>, Rc<RefCell<VolumeProfile>>) {
    let (chart, series) = common::chart_with_candles(20);
    let vp = Rc::new(RefCell::new(VolumeProfile::new(data)));
    series.attach_primitive(vp.clone());
    (chart, series, vp)
}

#[test]
fn widest_bucket_spans_the_full_width() {
    let (chart, series, vp) = attached(VolumeProfileData::new(vec![bucket(10.0, 5.0), bucket(20.0, 10.0)], 60.0));
    let vp = vp.borrow();
    let view = vp.view().expect("attached and visible");

    let widths: Vec<f32> = view.items.iter().map(|i| i.width).collect();
    assert_eq!(widths, vec![30.0, 60.0]);
    assert_eq!(view.x, Some(chart.time_scale_width()));

    let y10 = series.price_to_coordinate(10.0).expect("on scale");
    let y20 = series.price_to_coordinate(20.0).expect("on scale");
    assert!((view.column_height - (y10 - y20).abs()).abs() < 1e-3);
    assert_eq!(view.top, Some(y20));
}

#[test]
fn tiny_volumes_keep_a_one_pixel_bar() {
    let (_chart, _series, vp) = attached(VolumeProfileData::new(vec![bucket(100.0, 0.001), bucket(101.0, 1000.0)], 60.0));
    let vp = vp.borrow();
    let view = vp.view().expect("view");
    assert_eq!(view.items[0].width, 1.0);
}

#[test]
fn autoscale_reports_bucket_price_range() {
    let vp = VolumeProfile::new(VolumeProfileData::new(vec![bucket(90.0, 1.0), bucket(130.0, 2.0), bucket(110.0, 3.0)], 60.0));
    let info = vp.autoscale_info().expect("non-empty");
    assert_eq!((info.min_value, info.max_value), (90.0, 130.0));
}

#[test]
fn empty_and_single_bucket_profiles_draw_nothing() {
    let (_chart, _series, vp) = attached(VolumeProfileData::new(Vec::new(), 60.0));
    assert!(vp.borrow().autoscale_info().is_none());
    assert_eq!(vp.borrow().view().map(|v| v.x), Some(None));

    vp.borrow_mut().set_data(VolumeProfileData::new(vec![bucket(105.0, 4.0)], 60.0));
    let vp = vp.borrow();
    let view = vp.view().expect("view");
    assert_eq!(view.column_height, 0.0);
    assert_eq!(view.items.len(), 1);
}

#[test]
fn from_candles_spreads_volume_over_each_range() {
    let candles = [
        Candle { time: 1, open: 0.0, high: 10.0, low: 0.0, close: 10.0, volume: 100.0 },
        // no range: everything lands in the bin holding its price
        Candle { time: 2, open: 10.0, high: 10.0, low: 10.0, close: 10.0, volume: 50.0 },
    ];
    let data = VolumeProfileData::from_candles(&candles, 2, 60.0);
    assert_eq!(data.width, 60.0);
    assert_eq!(data.profile, vec![bucket(2.5, 50.0), bucket(7.5, 100.0)]);

    let total: f64 = data.profile.iter().map(|b| b.vol).sum();
    assert!(common::approx(total, 150.0, 1e-9));
}

#[test]
fn from_candles_preserves_total_volume() {
    let candles = common::candles(40);
    let data = VolumeProfileData::from_candles(&candles, 15, 60.0);
    assert_eq!(data.profile.len(), 15);
    let expected: f64 = candles.iter().map(|c| c.volume).sum();
    let total: f64 = data.profile.iter().map(|b| b.vol).sum();
    assert!(common::approx(total, expected, 1e-6));
    assert!(data.profile.windows(2).all(|w| w[0].price < w[1].price));
}

#[test]
fn from_candles_degenerate_inputs_are_empty() {
    assert!(VolumeProfileData::from_candles(&[], 15, 60.0).profile.is_empty());
    assert!(VolumeProfileData::from_candles(&common::candles(5), 0, 60.0).profile.is_empty());
}

#[test]
fn set_data_recomputes_views_and_schedules_autoscale() {
    let (chart, series, vp) = attached(VolumeProfileData::new(vec![bucket(100.0, 1.0), bucket(101.0, 1.0)], 60.0));
    vp.borrow_mut().set_data(VolumeProfileData::new(vec![bucket(50.0, 1.0), bucket(51.0, 2.0)], 40.0));
    assert_eq!(vp.borrow().view().map(|v| v.items[1].width), Some(40.0));

    // the next frame picks up the new autoscale request
    chart.render_to_png_bytes().expect("render");
    assert!(series.price_scale().vmin <= 50.0);
}
