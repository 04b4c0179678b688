// File: crates/chart-overlays/src/overlays/mod.rs
// Summary: Data-driven, non-interactive overlays.

pub mod heatmap;
pub mod vertical_line;
pub mod volume_profile;

pub use heatmap::{
    order_alpha, HeatmapItem, HeatmapOptions, HeatmapOrder, HeatmapPaneView, LiquidityHeatmap, LiquidityHeatmapData,
    OrderBookSnapshot, HEATMAP_LINE_HEIGHT, MAX_ORDER_ALPHA,
};
pub use vertical_line::{VerticalLine, VerticalLineOptions, VerticalLinePaneView};
pub use volume_profile::{
    VolumeProfile, VolumeProfileBucket, VolumeProfileData, VolumeProfileItem, VolumeProfileOptions,
    VolumeProfilePaneView, DEFAULT_PROFILE_WIDTH,
};
