// File: crates/chart-overlays/src/tools/drawing_tool.rs
// Summary: Click-driven two-point drawing state machine shared by every shape kind.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use tracing::{debug, info};

use crate::host::{ChartApi, MouseEventParams, PrimitiveHandle, SeriesApi, SubscriptionId};
use crate::tools::primitive::TwoPointPrimitive;
use crate::tools::shape::{DrawingKind, RectangleShape, ShapeStrategy, ShapeStyle, ToolOptions, TrendLineShape};
use crate::types::{MediaPoint, Point};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ToolState {
    /// Not subscribed to any pointer events.
    NotActive,
    Idle,
    AwaitingSecondPoint { start: Point },
}

/// A finalized (or removed) shape as reported to listeners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompletedShape {
    pub kind: DrawingKind,
    pub points: [Point; 2],
    pub style: ShapeStyle,
}

pub type ShapeCallback = Rc<dyn Fn(&CompletedShape)>;
/// Asked before a clicked shape is deleted; `false` keeps it.
pub type Confirm = Rc<dyn Fn(DrawingKind) -> bool>;

/// Lookup key of a committed shape, stable across store round-trips.
pub fn point_pair_key(points: &[Point; 2]) -> String {
    format!("{}:{}|{}:{}", points[0].time, points[0].price, points[1].time, points[1].price)
}

type Shared<S> = Rc<RefCell<TwoPointPrimitive<S>>>;

struct ToolInner<S: ShapeStrategy> {
    chart: Rc<dyn ChartApi>,
    series: Rc<dyn SeriesApi>,
    options: ToolOptions,
    state: ToolState,
    subscriptions: Option<(SubscriptionId, SubscriptionId)>,
    preview: Option<Shared<S>>,
    committed: Vec<Shared<S>>,
    /// Shapes with identical points share a key.
    by_key: HashMap<String, Vec<Shared<S>>>,
    on_complete: Vec<ShapeCallback>,
    on_remove: Vec<ShapeCallback>,
    confirm: Confirm,
}

impl<S: ShapeStrategy> ToolInner<S> {
    fn attach(&self, shape: &Shared<S>) {
        let handle: PrimitiveHandle = shape.clone();
        self.series.attach_primitive(handle);
    }

    fn detach(&self, shape: &Shared<S>) {
        let handle: PrimitiveHandle = shape.clone();
        self.series.detach_primitive(&handle);
    }

    fn pointer_point(&self, params: &MouseEventParams) -> Option<(MediaPoint, Point)> {
        let point = params.point?;
        let time = params.time?;
        let price = self.series.coordinate_to_price(point.y)?;
        Some((point, Point::new(time, price)))
    }

    fn commit(&mut self, shape: Shared<S>, points: [Point; 2]) {
        self.by_key.entry(point_pair_key(&points)).or_default().push(shape.clone());
        self.committed.push(shape);
    }

    fn forget(&mut self, shape: &Shared<S>) {
        self.committed.retain(|s| !Rc::ptr_eq(s, shape));
        self.by_key.retain(|_, shapes| {
            shapes.retain(|s| !Rc::ptr_eq(s, shape));
            !shapes.is_empty()
        });
    }
}

/// Two-click drawing tool: first click anchors, pointer moves preview, second click commits.
///
/// Clicking a committed shape while idle asks [`Confirm`] and removes it.
/// Handles are cheap clones sharing one state machine.
pub struct TwoPointDrawingTool<S: ShapeStrategy> {
    inner: Rc<RefCell<ToolInner<S>>>,
}

pub type RectangleDrawingTool = TwoPointDrawingTool<RectangleShape>;
pub type TrendLineDrawingTool = TwoPointDrawingTool<TrendLineShape>;

impl<S: ShapeStrategy> Clone for TwoPointDrawingTool<S> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<S: ShapeStrategy> TwoPointDrawingTool<S> {
    pub fn new(chart: Rc<dyn ChartApi>, series: Rc<dyn SeriesApi>) -> Self {
        Self::with_options(chart, series, S::default_options())
    }

    pub fn with_options(chart: Rc<dyn ChartApi>, series: Rc<dyn SeriesApi>, options: ToolOptions) -> Self {
        let inner = ToolInner {
            chart,
            series,
            options,
            state: ToolState::NotActive,
            subscriptions: None,
            preview: None,
            committed: Vec::new(),
            by_key: HashMap::new(),
            on_complete: Vec::new(),
            on_remove: Vec::new(),
            confirm: Rc::new(|_: DrawingKind| true),
        };
        Self { inner: Rc::new(RefCell::new(inner)) }
    }

    pub fn kind(&self) -> DrawingKind { S::KIND }

    pub fn options(&self) -> ToolOptions { self.inner.borrow().options }

    /// Called with every shape the user finalizes.
    pub fn on_complete(&self, callback: impl Fn(&CompletedShape) + 'static) {
        self.inner.borrow_mut().on_complete.push(Rc::new(callback));
    }

    /// Called with every shape deleted by clicking on it.
    pub fn on_remove(&self, callback: impl Fn(&CompletedShape) + 'static) {
        self.inner.borrow_mut().on_remove.push(Rc::new(callback));
    }

    pub fn set_confirm(&self, confirm: impl Fn(DrawingKind) -> bool + 'static) {
        self.inner.borrow_mut().confirm = Rc::new(confirm);
    }

    pub fn state(&self) -> ToolState { self.inner.borrow().state }

    pub fn is_active(&self) -> bool { self.inner.borrow().subscriptions.is_some() }

    pub fn has_preview(&self) -> bool { self.inner.borrow().preview.is_some() }

    pub fn committed_points(&self) -> Vec<[Point; 2]> {
        self.inner.borrow().committed.iter().map(|s| s.borrow().points()).collect()
    }

    pub fn committed_count(&self) -> usize { self.inner.borrow().committed.len() }

    /// Subscribe to clicks and pointer moves. No-op while already drawing.
    pub fn start_drawing(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.subscriptions.is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let click = inner.chart.subscribe_click(Rc::new(move |p: &MouseEventParams| {
            if let Some(tool) = upgrade(&weak) {
                tool.handle_click(p);
            }
        }));
        let weak = Rc::downgrade(&self.inner);
        let moved = inner.chart.subscribe_crosshair_move(Rc::new(move |p: &MouseEventParams| {
            if let Some(tool) = upgrade(&weak) {
                tool.handle_move(p);
            }
        }));
        inner.subscriptions = Some((click, moved));
        inner.state = ToolState::Idle;
        debug!(tool = S::NAME, "drawing started");
    }

    /// Unsubscribe, discard any uncommitted preview and go inactive. Safe to repeat.
    pub fn stop_drawing(&self) {
        let mut inner = self.inner.borrow_mut();
        if let Some((click, moved)) = inner.subscriptions.take() {
            inner.chart.unsubscribe_click(click);
            inner.chart.unsubscribe_crosshair_move(moved);
        }
        if let Some(preview) = inner.preview.take() {
            inner.detach(&preview);
        }
        if inner.state != ToolState::NotActive {
            debug!(tool = S::NAME, "drawing stopped");
        }
        inner.state = ToolState::NotActive;
    }

    /// Stop drawing and detach every committed shape. Safe to repeat.
    pub fn remove(&self) {
        self.stop_drawing();
        let mut inner = self.inner.borrow_mut();
        let committed = std::mem::take(&mut inner.committed);
        for shape in &committed {
            inner.detach(shape);
        }
        inner.by_key.clear();
    }

    /// Detach one committed shape with exactly these points. Returns false if none matches.
    pub fn remove_drawing_by_points(&self, points: &[Point; 2]) -> bool {
        let mut inner = self.inner.borrow_mut();
        let Some(shape) = inner.by_key.get_mut(&point_pair_key(points)).and_then(|shapes| shapes.pop()) else {
            return false;
        };
        inner.detach(&shape);
        inner.forget(&shape);
        debug!(tool = S::NAME, "drawing removed by key");
        true
    }

    /// Recreate a committed shape from persisted data without reporting completion.
    pub fn restore(&self, points: [Point; 2], style: ShapeStyle) {
        let shape = Rc::new(RefCell::new(TwoPointPrimitive::<S>::new(points, style)));
        let mut inner = self.inner.borrow_mut();
        inner.attach(&shape);
        inner.commit(shape, points);
    }

    pub fn handle_click(&self, params: &MouseEventParams) {
        let state = self.inner.borrow().state;
        match state {
            ToolState::NotActive => {}
            ToolState::Idle => self.click_idle(params),
            ToolState::AwaitingSecondPoint { start } => self.click_second(params, start),
        }
    }

    pub fn handle_move(&self, params: &MouseEventParams) {
        let mut inner = self.inner.borrow_mut();
        let ToolState::AwaitingSecondPoint { start } = inner.state else { return };
        let Some((_, end)) = inner.pointer_point(params) else { return };
        let points = [start, end];
        let style = inner.options.preview_style;
        match inner.preview.clone() {
            Some(preview) => preview.borrow_mut().set_points_and_style(points, style),
            None => {
                let preview = Rc::new(RefCell::new(TwoPointPrimitive::<S>::new(points, style)));
                inner.attach(&preview);
                inner.preview = Some(preview);
            }
        }
    }

    fn click_idle(&self, params: &MouseEventParams) {
        let hit = {
            let inner = self.inner.borrow();
            let Some(point) = params.point else { return };
            inner.committed.iter().find(|s| s.borrow().hit_test(point)).cloned()
        };
        if let Some(shape) = hit {
            let confirm = Rc::clone(&self.inner.borrow().confirm);
            if confirm(S::KIND) {
                self.remove_clicked(&shape);
            }
            return;
        }

        let mut inner = self.inner.borrow_mut();
        let Some((_, start)) = inner.pointer_point(params) else { return };
        inner.state = ToolState::AwaitingSecondPoint { start };
        debug!(tool = S::NAME, time = start.time, price = start.price, "first point placed");
    }

    fn click_second(&self, params: &MouseEventParams, start: Point) {
        let (completed, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let Some((_, end)) = inner.pointer_point(params) else { return };
            let points = [start, end];
            let style = inner.options.final_style;
            let shape = match inner.preview.take() {
                Some(preview) => {
                    preview.borrow_mut().set_points_and_style(points, style);
                    preview
                }
                None => {
                    let shape = Rc::new(RefCell::new(TwoPointPrimitive::<S>::new(points, style)));
                    inner.attach(&shape);
                    shape
                }
            };
            inner.commit(shape, points);
            inner.state = ToolState::Idle;
            (CompletedShape { kind: S::KIND, points, style }, inner.on_complete.clone())
        };
        info!(tool = S::NAME, points = ?completed.points, "drawing completed");
        for callback in callbacks {
            callback(&completed);
        }
    }

    fn remove_clicked(&self, shape: &Shared<S>) {
        let (removed, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            if !inner.committed.iter().any(|s| Rc::ptr_eq(s, shape)) {
                return;
            }
            inner.detach(shape);
            inner.forget(shape);
            let (points, style) = {
                let s = shape.borrow();
                (s.points(), s.style())
            };
            (CompletedShape { kind: S::KIND, points, style }, inner.on_remove.clone())
        };
        info!(tool = S::NAME, "drawing removed by click");
        for callback in callbacks {
            callback(&removed);
        }
    }
}

fn upgrade<S: ShapeStrategy>(weak: &Weak<RefCell<ToolInner<S>>>) -> Option<TwoPointDrawingTool<S>> {
    weak.upgrade().map(|inner| TwoPointDrawingTool { inner })
}
