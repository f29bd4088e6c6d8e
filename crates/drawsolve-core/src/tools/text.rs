//! Text mode: place an entry point, commit on submit.

use super::{HandlerContext, ModeHandler};
use crate::input::PointerInput;
use kurbo::Point;

/// Holds the world position of an open text entry.
#[derive(Debug, Default)]
pub struct TextHandler {
    pending: Option<Point>,
}

impl TextHandler {
    pub fn pending(&self) -> Option<Point> {
        self.pending
    }

    pub fn take_pending(&mut self) -> Option<Point> {
        self.pending.take()
    }
}

impl ModeHandler for TextHandler {
    fn pointer_down(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        self.pending = Some(cx.view.to_world(input.position));
    }

    fn pointer_move(&mut self, _cx: &mut HandlerContext<'_>, _input: PointerInput) {}

    fn pointer_up(&mut self, _cx: &mut HandlerContext<'_>, _input: PointerInput) {}

    fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    fn cancel(&mut self) {
        self.pending = None;
    }
}
