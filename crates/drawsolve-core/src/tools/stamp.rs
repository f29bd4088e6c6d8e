//! Shape mode: anchor-to-current drag stamps.

use super::{HandlerContext, ModeHandler, ToolSettings};
use crate::input::PointerInput;
use crate::shapes::Shape;
use crate::snap::snap_line_endpoint;
use kurbo::Point;

#[derive(Debug, Default)]
pub struct ShapeHandler {
    anchor: Option<Point>,
    current: Point,
}

impl ShapeHandler {
    fn track(&mut self, cx: &HandlerContext<'_>, input: PointerInput) {
        let Some(anchor) = self.anchor else { return };
        let mut point = cx.view.to_world(input.position);
        if input.modifiers.shift && cx.tools.shape.is_segment() {
            point = snap_line_endpoint(anchor, point).point;
        }
        self.current = point;
    }
}

impl ModeHandler for ShapeHandler {
    fn pointer_down(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        let anchor = cx.view.to_world(input.position);
        self.anchor = Some(anchor);
        self.current = anchor;
    }

    fn pointer_move(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        self.track(cx, input);
    }

    fn pointer_up(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        self.track(cx, input);
        let Some(anchor) = self.anchor.take() else { return };
        let shape = cx.tools.stamp(anchor, self.current);
        cx.document.commit_shape(shape);
    }

    fn preview(&self, tools: &ToolSettings) -> Option<Shape> {
        let anchor = self.anchor?;
        let shape = tools.stamp(anchor, self.current);
        (!shape.is_degenerate()).then_some(shape)
    }

    fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    fn cancel(&mut self) {
        self.anchor = None;
    }
}
