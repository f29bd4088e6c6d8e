//! Hand mode: screen-space panning.

use super::{HandlerContext, ModeHandler};
use crate::input::PointerInput;
use kurbo::Point;

#[derive(Debug, Default)]
pub struct HandHandler {
    last: Option<Point>,
}

impl ModeHandler for HandHandler {
    fn pointer_down(&mut self, _cx: &mut HandlerContext<'_>, input: PointerInput) {
        self.last = Some(input.position);
    }

    fn pointer_move(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        let Some(last) = self.last else { return };
        cx.view.pan(input.position - last);
        self.last = Some(input.position);
    }

    fn pointer_up(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        if let Some(last) = self.last.take() {
            cx.view.pan(input.position - last);
        }
    }

    fn is_active(&self) -> bool {
        self.last.is_some()
    }

    fn cancel(&mut self) {
        self.last = None;
    }
}
