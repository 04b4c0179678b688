// File: crates/chart-overlays/tests/heatmap.rs
// Purpose: Heatmap intensity normalisation, snapshot expansion and off-domain orders.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use chart_overlays::overlays::{order_alpha, MAX_ORDER_ALPHA};
use chart_overlays::{HeatmapOrder, LiquidityHeatmap, LiquidityHeatmapData, OrderBookSnapshot, SeriesApi, SeriesPrimitive};

fn order(price: f64, volume: f64, start: i64, end: i64, is_bid: bool) -> HeatmapOrder {
    HeatmapOrder { price, volume, start_time: common::t(start), end_time: common::t(end), is_bid }
}

#[test]
fn alpha_saturates_at_half() {
    assert_eq!(order_alpha(10.0, 10.0), MAX_ORDER_ALPHA);
    assert_eq!(order_alpha(1e15, 1e15), 0.5);
    assert_eq!(order_alpha(2.0, 10.0), 0.2);
    assert_eq!(order_alpha(5.0, 0.0), 0.0);
    assert_eq!(order_alpha(f64::NAN, 10.0), 0.0);
}

#[test]
fn max_volume_order_renders_at_exactly_half_alpha() {
    let (_chart, series) = common::chart_with_candles(20);
    let data = LiquidityHeatmapData::new(vec![
        order(104.0, 1_000_000.0, 2, 6, true),
        order(108.0, 250_000.0, 3, 9, false),
    ]);
    let heatmap = Rc::new(RefCell::new(LiquidityHeatmap::new(data)));
    series.attach_primitive(heatmap.clone());

    let heatmap = heatmap.borrow();
    let items = &heatmap.view().expect("attached").items;
    assert_eq!(items[0].alpha, 0.5);
    assert_eq!(items[1].alpha, 0.25);
    assert!(items.iter().all(|i| i.y.is_some() && i.start_x.is_some() && i.end_x.is_some()));
    assert!(items[0].is_bid && !items[1].is_bid);
}

#[test]
fn orders_outside_the_time_range_have_no_geometry() {
    let (_chart, series) = common::chart_with_candles(10);
    let heatmap = Rc::new(RefCell::new(LiquidityHeatmap::new(LiquidityHeatmapData::new(vec![order(
        104.0, 1.0, 2, 40, true,
    )]))));
    series.attach_primitive(heatmap.clone());
    let heatmap = heatmap.borrow();
    let item = heatmap.view().expect("view").items[0];
    assert!(item.start_x.is_some());
    assert_eq!(item.end_x, None);
}

#[test]
fn snapshots_expand_into_bid_and_ask_orders() {
    let snaps = [
        OrderBookSnapshot { time: 10, end_time: 20, bid: 99.5, ask: 100.5, bid_volume: 3.0, ask_volume: 4.0 },
        OrderBookSnapshot { time: 20, end_time: 30, bid: 99.0, ask: 101.0, bid_volume: 5.0, ask_volume: 1.0 },
    ];
    let data = LiquidityHeatmapData::from_snapshots(&snaps);
    assert_eq!(data.orders.len(), 4);
    assert_eq!(data.orders[1], HeatmapOrder { price: 100.5, volume: 4.0, start_time: 10, end_time: 20, is_bid: false });
    assert_eq!(data.max_volume(), Some(5.0));

    let info = LiquidityHeatmap::new(data).autoscale_info().expect("orders present");
    assert_eq!((info.min_value, info.max_value), (99.0, 101.0));
}

#[test]
fn empty_heatmap_has_no_autoscale_and_no_items() {
    let (_chart, series) = common::chart_with_candles(10);
    let heatmap = Rc::new(RefCell::new(LiquidityHeatmap::new(LiquidityHeatmapData::default())));
    series.attach_primitive(heatmap.clone());
    assert!(heatmap.borrow().autoscale_info().is_none());
    assert!(heatmap.borrow().view().expect("view").items.is_empty());
}

#[test]
fn orders_deserialize_from_camel_case() {
    let json = r#"{"orders":[{"price":101.5,"volume":7,"startTime":5,"endTime":9,"isBid":true}]}"#;
    let data: LiquidityHeatmapData = serde_json::from_str(json).expect("valid json");
    assert_eq!(data.orders[0].end_time, 9);
    assert!(data.orders[0].is_bid);
}
