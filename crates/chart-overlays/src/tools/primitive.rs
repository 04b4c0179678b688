// File: crates/chart-overlays/src/tools/primitive.rs
// Summary: Primitive holding one two-point drawing; geometry delegated to its shape strategy.

use std::marker::PhantomData;

use crate::geometry::map_point;
use crate::primitive::{PaneRenderer, PaneView, PrimitiveBase, RenderTarget, SeriesPrimitive};
use crate::tools::shape::{RectangleShape, ShapeStrategy, ShapeStyle, TrendLineShape};
use crate::types::{MediaPoint, Point};

pub struct TwoPointPaneView<S> {
    pub a: Option<MediaPoint>,
    pub b: Option<MediaPoint>,
    style: ShapeStyle,
    _shape: PhantomData<fn() -> S>,
}

impl<S: ShapeStrategy> PaneView for TwoPointPaneView<S> {
    fn renderer(&self) -> &dyn PaneRenderer { self }
}

impl<S: ShapeStrategy> PaneRenderer for TwoPointPaneView<S> {
    fn draw(&self, target: &RenderTarget<'_>) {
        if let (Some(a), Some(b)) = (self.a, self.b) {
            S::draw(target, a, b, &self.style);
        }
    }
}

pub struct TwoPointPrimitive<S: ShapeStrategy> {
    base: PrimitiveBase,
    points: [Point; 2],
    style: ShapeStyle,
    views: Vec<TwoPointPaneView<S>>,
}

pub type RectanglePrimitive = TwoPointPrimitive<RectangleShape>;
pub type TrendLinePrimitive = TwoPointPrimitive<TrendLineShape>;

impl<S: ShapeStrategy> TwoPointPrimitive<S> {
    pub fn new(points: [Point; 2], style: ShapeStyle) -> Self {
        Self { base: PrimitiveBase::new(S::NAME), points, style, views: Vec::new() }
    }

    pub fn points(&self) -> [Point; 2] { self.points }

    pub fn style(&self) -> ShapeStyle { self.style }

    pub fn set_points_and_style(&mut self, points: [Point; 2], style: ShapeStyle) {
        self.points = points;
        self.style = style;
        self.update_all_views();
        self.base.request_update();
    }

    /// Hit test against the current scales; false when unattached or off-domain.
    pub fn hit_test(&self, p: MediaPoint) -> bool {
        let (Ok(chart), Ok(series)) = (self.base.chart(), self.base.series()) else {
            return false;
        };
        let a = map_point(chart.as_ref(), series.as_ref(), self.points[0]);
        let b = map_point(chart.as_ref(), series.as_ref(), self.points[1]);
        match (a, b) {
            (Some(a), Some(b)) => S::hit_test(a, b, p),
            _ => false,
        }
    }

    pub fn view(&self) -> Option<&TwoPointPaneView<S>> { self.views.first() }
}

impl<S: ShapeStrategy> SeriesPrimitive for TwoPointPrimitive<S> {
    fn base(&self) -> &PrimitiveBase { &self.base }
    fn base_mut(&mut self) -> &mut PrimitiveBase { &mut self.base }

    fn update_all_views(&mut self) {
        self.views.clear();
        if !self.base.should_render() {
            return;
        }
        let (Ok(chart), Ok(series)) = (self.base.chart(), self.base.series()) else { return };
        self.views.push(TwoPointPaneView {
            a: map_point(chart.as_ref(), series.as_ref(), self.points[0]),
            b: map_point(chart.as_ref(), series.as_ref(), self.points[1]),
            style: self.style,
            _shape: PhantomData,
        });
    }

    fn pane_views(&self) -> Vec<&dyn PaneView> {
        self.views.iter().map(|v| v as &dyn PaneView).collect()
    }
}
