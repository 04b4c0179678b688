use std::cell::RefCell;
use std::rc::Rc;

use anyhow::Result;
use chart_overlays::{
    Candle, HeadlessChart, HeatmapOrder, LiquidityHeatmap, LiquidityHeatmapData, PrimitiveHandle, RenderOptions,
    SeriesApi, VolumeProfile, VolumeProfileData,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let mid = 100.0 + (i as f64 * 0.01).sin() * 10.0;
            Candle {
                time: 1_700_000_000 + i as i64 * 60,
                open: mid - 0.5,
                high: mid + 1.5,
                low: mid - 1.5,
                close: mid + 0.5,
                volume: 10.0 + (i % 50) as f64,
            }
        })
        .collect()
}

fn orders(n: usize, t0: i64) -> Vec<HeatmapOrder> {
    (0..n)
        .map(|i| HeatmapOrder {
            price: 90.0 + (i % 200) as f64 * 0.1,
            volume: (i % 37) as f64 + 1.0,
            start_time: t0 + (i % 500) as i64 * 60,
            end_time: t0 + (i % 500) as i64 * 60 + 600,
            is_bid: i % 2 == 0,
        })
        .collect()
}

fn bench_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("volume_profile_from_candles");
    for &n in &[10_000usize, 100_000usize] {
        let data = candles(n);
        group.bench_function(format!("candles_{n}"), |b| {
            b.iter(|| black_box(VolumeProfileData::from_candles(&data, 50, 60.0)));
        });
    }
    group.finish();
}

fn bench_heatmap(c: &mut Criterion) {
    let mut group = c.benchmark_group("heatmap_set_data");
    for &n in &[1_000usize, 10_000usize] {
        group.bench_function(format!("orders_{n}"), |b| {
            let chart = HeadlessChart::new(RenderOptions::default());
            let series = chart.add_candlestick_series();
            series.set_data(candles(500));
            let heatmap = Rc::new(RefCell::new(LiquidityHeatmap::new(LiquidityHeatmapData::default())));
            let handle: PrimitiveHandle = heatmap.clone();
            series.attach_primitive(handle);
            let data = LiquidityHeatmapData::new(orders(n, 1_700_000_000));
            b.iter(|| -> Result<()> {
                heatmap.borrow_mut().set_data(data.clone());
                black_box(chart.render_to_png_bytes()?.len());
                Ok(())
            });
            chart.remove();
        });
    }
    group.finish();
}

criterion_group!(benches, bench_profile, bench_heatmap);
criterion_main!(benches);
