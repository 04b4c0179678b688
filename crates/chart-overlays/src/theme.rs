// File: crates/chart-overlays/src/theme.rs
// Summary: CSS-style colors and light/dark theming for the host frame and overlays.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skia_safe as skia;

use crate::error::ColorParseError;

/// Straight-alpha color; serialized as a CSS `rgba(...)` string.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// 0.0 ..= 1.0
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Same color with its alpha replaced.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a: a.clamp(0.0, 1.0), ..self }
    }

    /// Same color with its alpha multiplied (canvas `globalAlpha` semantics).
    pub fn with_opacity(self, opacity: f32) -> Self {
        self.with_alpha(self.a * opacity)
    }

    pub fn to_skia(self) -> skia::Color {
        let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
        skia::Color::from_argb(a, self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let bad = || ColorParseError(s.to_string());
        if let Some(hex) = raw.strip_prefix('#') {
            let byte = |i: usize| hex.get(i..i + 2).and_then(|h| u8::from_str_radix(h, 16).ok()).ok_or_else(bad);
            return match hex.len() {
                6 => Ok(Self::opaque(byte(0)?, byte(2)?, byte(4)?)),
                8 => Ok(Self::new(byte(0)?, byte(2)?, byte(4)?, byte(6)? as f32 / 255.0)),
                _ => Err(bad()),
            };
        }
        let (body, with_alpha) = if let Some(b) = raw.strip_prefix("rgba(") {
            (b, true)
        } else if let Some(b) = raw.strip_prefix("rgb(") {
            (b, false)
        } else {
            return Err(bad());
        };
        let parts: Vec<&str> = body.strip_suffix(')').ok_or_else(bad)?.split(',').map(str::trim).collect();
        let channel = |i: usize| parts[i].parse::<u8>().map_err(|_| bad());
        match (parts.len(), with_alpha) {
            (4, true) => {
                let a = parts[3].parse::<f32>().map_err(|_| bad())?;
                Ok(Self::new(channel(0)?, channel(1)?, channel(2)?, a.clamp(0.0, 1.0)))
            }
            (3, false) => Ok(Self::opaque(channel(0)?, channel(1)?, channel(2)?)),
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self { value.to_string() }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgba,
    pub grid: Rgba,
    pub candle_up: Rgba,
    pub candle_down: Rgba,
    pub wick_up: Rgba,
    pub wick_down: Rgba,
    pub volume_profile: Rgba,
    pub heatmap_bid: Rgba,
    pub heatmap_ask: Rgba,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Rgba::opaque(0x11, 0x11, 0x13),
            grid: Rgba::new(0x2e, 0x2f, 0x30, 0x55 as f32 / 255.0),
            candle_up: Rgba::opaque(0x41, 0xa3, 0x5b),
            candle_down: Rgba::opaque(0x0c, 0x5b, 0x3b),
            wick_up: Rgba::new(0x41, 0xa3, 0x50, 0x88 as f32 / 255.0),
            wick_down: Rgba::new(0x0c, 0x5b, 0x3b, 0x88 as f32 / 255.0),
            volume_profile: Rgba::new(65, 163, 91, 0.2),
            heatmap_bid: Rgba::opaque(65, 163, 91),
            heatmap_ask: Rgba::opaque(235, 64, 52),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Rgba::opaque(250, 250, 252),
            grid: Rgba::opaque(230, 230, 235),
            candle_up: Rgba::opaque(20, 160, 90),
            candle_down: Rgba::opaque(200, 60, 60),
            wick_up: Rgba::new(20, 160, 90, 0.6),
            wick_down: Rgba::new(200, 60, 60, 0.6),
            volume_profile: Rgba::new(40, 120, 200, 0.2),
            heatmap_bid: Rgba::opaque(20, 160, 90),
            heatmap_ask: Rgba::opaque(200, 60, 60),
        }
    }

    pub fn high_contrast_dark() -> Self {
        Self {
            name: "high-contrast-dark",
            background: Rgba::opaque(0x00, 0x00, 0x00),
            grid: Rgba::opaque(0x22, 0x22, 0x22),
            candle_up: Rgba::opaque(0x00, 0xff, 0x00),
            candle_down: Rgba::opaque(0xff, 0x00, 0x00),
            wick_up: Rgba::opaque(0x00, 0xff, 0x00),
            wick_down: Rgba::opaque(0xff, 0x00, 0x00),
            volume_profile: Rgba::new(0x00, 0xaa, 0xff, 0.3),
            heatmap_bid: Rgba::opaque(0x00, 0xff, 0x00),
            heatmap_ask: Rgba::opaque(0xff, 0x00, 0x00),
        }
    }
}

impl Default for Theme {
    fn default() -> Self { Self::dark() }
}

/// Return a list of built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::dark(), Theme::light(), Theme::high_contrast_dark()]
}

/// Find a theme by its `name`, falling back to dark.
pub fn find(name: &str) -> Theme {
    presets()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(Theme::dark)
}
