// File: crates/chart-overlays/src/series.rs
// Summary: OHLCV candle model shared by the host series and the overlay data helpers.

use serde::{Deserialize, Serialize};

use crate::types::Time;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: Time,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    /// Try to construct a candle enforcing OHLC invariants:
    /// low <= min(open,close), high >= max(open,close), volume >= 0.
    pub fn try_new(time: Time, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Result<Self, &'static str> {
        let lo = open.min(close);
        let hi = open.max(close);
        if low > lo { return Err("low above min(open,close)"); }
        if high < hi { return Err("high below max(open,close)"); }
        if volume < 0.0 { return Err("negative volume"); }
        Ok(Self { time, open, high, low, close, volume })
    }

    pub fn is_up(&self) -> bool { self.close >= self.open }

    /// Close minus open.
    pub fn delta(&self) -> f64 { self.close - self.open }
}
