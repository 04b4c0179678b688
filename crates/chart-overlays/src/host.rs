// File: crates/chart-overlays/src/host.rs
// Summary: Host chart/series contract consumed by overlays (coordinate mapping, events, primitive registry).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::primitive::SeriesPrimitive;
use crate::series::Candle;
use crate::types::{Coordinate, MediaPoint, Time};

/// Shared handle to an attachable overlay.
pub type PrimitiveHandle = Rc<RefCell<dyn SeriesPrimitive>>;

/// Callback invoked for click and crosshair-move notifications.
pub type EventHandler = Rc<dyn Fn(&MouseEventParams)>;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Token returned by a subscription, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn next() -> Self {
        Self(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Pointer event as delivered by the host.
///
/// `point` is `None` when the pointer left the pane; `time` is `None` when the
/// pointer is not over a bar.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MouseEventParams {
    pub point: Option<MediaPoint>,
    pub time: Option<Time>,
}

/// Chart-wide services: the time axis and pointer notifications.
pub trait ChartApi {
    fn time_to_coordinate(&self, time: Time) -> Option<Coordinate>;
    fn coordinate_to_time(&self, x: Coordinate) -> Option<Time>;
    /// Width of the plotted time range in media pixels.
    fn time_scale_width(&self) -> Coordinate;
    /// Ask for autoscale + view recomputation before the next frame.
    fn request_update(&self);

    fn subscribe_click(&self, handler: EventHandler) -> SubscriptionId;
    /// Unknown ids are ignored.
    fn unsubscribe_click(&self, id: SubscriptionId);
    fn subscribe_crosshair_move(&self, handler: EventHandler) -> SubscriptionId;
    /// Unknown ids are ignored.
    fn unsubscribe_crosshair_move(&self, id: SubscriptionId);
}

/// Series-level services: the price axis, bar lookup and the primitive registry.
pub trait SeriesApi {
    fn price_to_coordinate(&self, price: f64) -> Option<Coordinate>;
    fn coordinate_to_price(&self, y: Coordinate) -> Option<f64>;
    fn bar_at(&self, time: Time) -> Option<Candle>;

    /// Registers the primitive and calls its `attached` hook.
    fn attach_primitive(&self, primitive: PrimitiveHandle);
    /// Calls the primitive's `detached` hook; no-op if it is not attached here.
    fn detach_primitive(&self, primitive: &PrimitiveHandle);
}

/// Host pair handed to a primitive on attach.
#[derive(Clone)]
pub struct SeriesAttachedParameter {
    pub chart: Rc<dyn ChartApi>,
    pub series: Rc<dyn SeriesApi>,
}
