//! Move mode: pick the topmost object and drag it.

use super::{HandlerContext, ModeHandler};
use crate::hit::find_topmost_at;
use crate::input::PointerInput;
use kurbo::Vec2;

#[derive(Debug, Clone, Copy)]
struct Grab {
    index: usize,
    /// Pointer position minus the object's reference point at grab time.
    offset: Vec2,
    moved: bool,
}

#[derive(Debug, Default)]
pub struct MoveHandler {
    grab: Option<Grab>,
}

impl MoveHandler {
    pub fn selected(&self) -> Option<usize> {
        self.grab.map(|g| g.index)
    }
}

impl ModeHandler for MoveHandler {
    fn pointer_down(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        let world = cx.view.to_world(input.position);
        self.grab = find_topmost_at(cx.document.objects(), world).map(|index| Grab {
            index,
            offset: world - cx.document.objects()[index].reference_point(),
            moved: false,
        });
    }

    fn pointer_move(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput) {
        let Some(grab) = self.grab.as_mut() else { return };
        let Some(shape) = cx.document.objects().get(grab.index) else {
            self.grab = None;
            return;
        };
        let world = cx.view.to_world(input.position);
        let delta = (world - grab.offset) - shape.reference_point();
        if delta.hypot2() == 0.0 {
            return;
        }
        let moved = shape.translated(delta);
        cx.document.replace(grab.index, moved);
        grab.moved = true;
    }

    fn pointer_up(&mut self, cx: &mut HandlerContext<'_>, _input: PointerInput) {
        if let Some(grab) = self.grab.take() {
            if grab.moved {
                cx.document.commit_current();
            }
        }
    }

    fn is_active(&self) -> bool {
        self.grab.is_some()
    }

    fn cancel(&mut self) {
        self.grab = None;
    }
}
