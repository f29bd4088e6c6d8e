//! Draw and erase: freehand point accumulation.

use super::{HandlerContext, ModeHandler, ToolSettings};
use crate::input::PointerInput;
use crate::shapes::{BlendMode, Freehand, Shape};
use crate::snap::snap_line_endpoint;
use kurbo::Point;

/// Accumulates world points between pointer-down and pointer-up.
#[derive(Debug)]
pub struct PathHandler {
    blend: BlendMode,
    points: Vec<Point>,
    active: bool,
}

impl PathHandler {
    pub fn new(blend: BlendMode) -> Self {
        Self {
            blend,
            points: Vec::new(),
            active: false,
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    fn build(&self, tools: &ToolSettings, points: Vec<Point>) -> Freehand {
        let mut path = Freehand::from_points(points);
        path.blend = self.blend;
        path.style = tools.path_style(self.blend);
        path
    }
}

impl ModeHandler for PathHandler {
    fn pointer_down(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        self.points.clear();
        self.points.push(cx.view.to_world(input.position));
        self.active = true;
    }

    fn pointer_move(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        if !self.active {
            return;
        }
        let mut point = cx.view.to_world(input.position);
        if input.modifiers.shift {
            if let Some(&last) = self.points.last() {
                point = snap_line_endpoint(last, point).point;
            }
        }
        self.points.push(point);
    }

    fn pointer_up(&mut self, cx: &mut HandlerContext<'_>, _input: PointerInput) {
        if !self.active {
            return;
        }
        let points = std::mem::take(&mut self.points);
        self.active = false;
        let path = self.build(cx.tools, points);
        cx.document.commit_shape(Shape::Freehand(path));
    }

    fn preview(&self, tools: &ToolSettings) -> Option<Shape> {
        (self.active && self.points.len() >= 2)
            .then(|| Shape::Freehand(self.build(tools, self.points.clone())))
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn cancel(&mut self) {
        self.points.clear();
        self.active = false;
    }
}
