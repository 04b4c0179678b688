// File: crates/chart-overlays/src/lib.rs
// Summary: Overlay layer entry point; exports primitives, tools, the annotation store and the headless host.

pub mod chart;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod overlays;
pub mod primitive;
pub mod scale;
pub mod series;
pub mod store;
pub mod text;
pub mod theme;
pub mod tools;
pub mod types;
pub mod view;

pub use chart::{CandlestickSeries, HeadlessChart, RenderOptions};
pub use config::OverlayConfig;
pub use error::{ConfigError, PrimitiveError, StoreError};
pub use geometry::{distance_to_line, positions_box, positions_line, span_to_rect, BitmapSpan, MediaRect};
pub use host::{ChartApi, MouseEventParams, PrimitiveHandle, SeriesApi, SeriesAttachedParameter, SubscriptionId};
pub use overlays::{
    HeatmapOrder, LiquidityHeatmap, LiquidityHeatmapData, OrderBookSnapshot, VerticalLine, VolumeProfile,
    VolumeProfileBucket, VolumeProfileData,
};
pub use primitive::{AutoscaleInfo, Lifecycle, PaneRenderer, PaneView, PrimitiveBase, RenderTarget, SeriesPrimitive};
pub use series::Candle;
pub use store::{AnnotationStore, Drawing, DrawingStyle, FileStorage, MemoryStorage, StorageBackend, StoreEvent};
pub use theme::{Rgba, Theme};
pub use tools::{
    DrawingKind, DrawingToolType, RectangleDrawingTool, ShapeStyle, ToolOptions, ToolState, Toolbox,
    TrendLineDrawingTool,
};
pub use types::{Coordinate, Insets, MediaPoint, Point, Time};
