// File: crates/chart-overlays/src/tools/toolbox.rs
// Summary: Active-tool switching and store reconciliation for one chart/series pair.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::OverlayConfig;
use crate::host::{ChartApi, SeriesApi};
use crate::store::{AnnotationStore, Drawing, DrawingStyle, ListenerId, StoreEvent};
use crate::tools::drawing_tool::{CompletedShape, RectangleDrawingTool, TrendLineDrawingTool};
use crate::tools::shape::DrawingKind;
use crate::tools::tooltip::DeltaTooltipTool;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingToolType {
    #[default]
    None,
    Rectangle,
    TrendLine,
    Delta,
}

pub struct Toolbox {
    store: Rc<AnnotationStore>,
    rectangle: RectangleDrawingTool,
    trend_line: TrendLineDrawingTool,
    tooltip: DeltaTooltipTool,
    active: Cell<DrawingToolType>,
    listener: Cell<Option<ListenerId>>,
}

impl Toolbox {
    /// Build the tools, redraw every stored drawing and wire tools and store together.
    pub fn new(
        chart: Rc<dyn ChartApi>,
        series: Rc<dyn SeriesApi>,
        store: Rc<AnnotationStore>,
        config: &OverlayConfig,
    ) -> Self {
        let rectangle = RectangleDrawingTool::with_options(chart.clone(), series.clone(), config.rectangle);
        let trend_line = TrendLineDrawingTool::with_options(chart.clone(), series.clone(), config.trend_line);
        let tooltip = DeltaTooltipTool::new(chart, series, config.tooltip);

        for drawing in store.drawings() {
            match drawing.kind() {
                DrawingKind::Rectangle => {
                    rectangle.restore(drawing.points, drawing.style.to_shape(&config.rectangle.final_style))
                }
                DrawingKind::TrendLine => {
                    trend_line.restore(drawing.points, drawing.style.to_shape(&config.trend_line.final_style))
                }
            }
        }

        // set while a tool deletes the record of a shape it already detached
        let removing = Rc::new(Cell::new(false));
        rectangle.on_complete(bind_complete(&store));
        trend_line.on_complete(bind_complete(&store));
        rectangle.on_remove(bind_remove(&store, &removing));
        trend_line.on_remove(bind_remove(&store, &removing));

        let (r, t) = (rectangle.clone(), trend_line.clone());
        let listener = store.subscribe(move |event| match event {
            StoreEvent::Added(_) => {}
            StoreEvent::Removed(_) if removing.get() => {}
            StoreEvent::Removed(d) => detach_drawing(&r, &t, d),
            StoreEvent::Cleared(all) => all.iter().for_each(|d| detach_drawing(&r, &t, d)),
        });

        Self {
            store,
            rectangle,
            trend_line,
            tooltip,
            active: Cell::new(DrawingToolType::None),
            listener: Cell::new(Some(listener)),
        }
    }

    pub fn active(&self) -> DrawingToolType { self.active.get() }

    pub fn rectangle(&self) -> &RectangleDrawingTool { &self.rectangle }

    pub fn trend_line(&self) -> &TrendLineDrawingTool { &self.trend_line }

    pub fn tooltip(&self) -> &DeltaTooltipTool { &self.tooltip }

    pub fn store(&self) -> &Rc<AnnotationStore> { &self.store }

    /// Make `tool` the only active tool; reselecting the active tool is a no-op.
    pub fn select(&self, tool: DrawingToolType) {
        if self.active.get() == tool {
            return;
        }
        self.rectangle.stop_drawing();
        self.trend_line.stop_drawing();
        self.tooltip.deactivate();
        match tool {
            DrawingToolType::None => {}
            DrawingToolType::Rectangle => self.rectangle.start_drawing(),
            DrawingToolType::TrendLine => self.trend_line.start_drawing(),
            DrawingToolType::Delta => self.tooltip.activate(),
        }
        debug!(?tool, "active tool changed");
        self.active.set(tool);
    }

    /// Stop listening to the store and detach every primitive the tools own. Safe to repeat.
    pub fn remove(&self) {
        if let Some(id) = self.listener.take() {
            self.store.unsubscribe(id);
        }
        self.rectangle.remove();
        self.trend_line.remove();
        self.tooltip.deactivate();
        self.active.set(DrawingToolType::None);
    }
}

fn bind_complete(store: &Rc<AnnotationStore>) -> impl Fn(&CompletedShape) + 'static {
    let store: Weak<AnnotationStore> = Rc::downgrade(store);
    move |shape: &CompletedShape| {
        let Some(store) = store.upgrade() else { return };
        let drawing = Drawing::new(shape.points, DrawingStyle::from_shape(shape.kind, &shape.style));
        if let Err(err) = store.add(drawing) {
            warn!(%err, "failed to persist drawing");
        }
    }
}

fn bind_remove(store: &Rc<AnnotationStore>, removing: &Rc<Cell<bool>>) -> impl Fn(&CompletedShape) + 'static {
    let store: Weak<AnnotationStore> = Rc::downgrade(store);
    let removing = Rc::clone(removing);
    move |shape: &CompletedShape| {
        let Some(store) = store.upgrade() else { return };
        removing.set(true);
        let result = store.remove_by_points(shape.kind, &shape.points);
        removing.set(false);
        if let Err(err) = result {
            warn!(%err, "failed to delete drawing");
        }
    }
}

fn detach_drawing(rectangle: &RectangleDrawingTool, trend_line: &TrendLineDrawingTool, drawing: &Drawing) {
    match drawing.kind() {
        DrawingKind::Rectangle => rectangle.remove_drawing_by_points(&drawing.points),
        DrawingKind::TrendLine => trend_line.remove_drawing_by_points(&drawing.points),
    };
}
