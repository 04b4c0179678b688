// File: crates/chart-overlays/src/tools/mod.rs
// Summary: Interactive tools: two-point drawing state machines, the delta tooltip and the toolbox.

pub mod drawing_tool;
pub mod primitive;
pub mod shape;
pub mod toolbox;
pub mod tooltip;

pub use drawing_tool::{
    point_pair_key, CompletedShape, Confirm, RectangleDrawingTool, ToolState, TrendLineDrawingTool, TwoPointDrawingTool,
};
pub use primitive::{RectanglePrimitive, TrendLinePrimitive, TwoPointPaneView, TwoPointPrimitive};
pub use shape::{
    DrawingKind, RectangleShape, ShapeStrategy, ShapeStyle, ToolOptions, TrendLineShape, TREND_LINE_HIT_TOLERANCE,
};
pub use toolbox::{DrawingToolType, Toolbox};
pub use tooltip::{format_label, DeltaTooltip, DeltaTooltipOptions, DeltaTooltipTool};
