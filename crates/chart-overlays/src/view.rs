// File: crates/chart-overlays/src/view.rs
// Summary: Autoscale helpers: visible price range of candles merged with overlay autoscale requests.

use crate::primitive::AutoscaleInfo;
use crate::scale::Logical;
use crate::series::Candle;

/// Fraction of the price span added above and below the autoscaled range.
pub const AUTOSCALE_MARGIN: f64 = 0.02;

/// Low/high envelope of candles whose logical index falls in `[first, last]`.
///
/// `index_of` maps a candle to its logical position on the time scale.
pub fn visible_price_range<F>(candles: &[Candle], first: Logical, last: Logical, index_of: F) -> Option<AutoscaleInfo>
where
    F: Fn(&Candle) -> Option<Logical>,
{
    let visible = candles.iter().filter(|c| match index_of(c) {
        Some(i) => i >= first && i <= last,
        None => false,
    });
    AutoscaleInfo::from_prices(visible.flat_map(|c| [c.low, c.high]))
}

/// Merge the candle range with overlay requests and pad by `margin` of the span.
pub fn autoscale_range(
    candles: Option<AutoscaleInfo>,
    overlays: impl IntoIterator<Item = AutoscaleInfo>,
    margin: f64,
) -> Option<(f64, f64)> {
    let merged = overlays.into_iter().fold(candles, |acc, info| match acc {
        Some(r) => Some(r.merge(info)),
        None => Some(info),
    })?;
    let mut lo = merged.min_value;
    let mut hi = merged.max_value;
    if (hi - lo).abs() < 1e-9 {
        lo -= 0.5;
        hi += 0.5;
    }
    let m = (hi - lo) * margin;
    Some((lo - m, hi + m))
}
