//! Canvas document and interaction session.

use crate::camera::ViewTransform;
use crate::config::Settings;
use crate::history::History;
use crate::input::{PointerEvent, PointerInput};
use crate::shapes::{Shape, ShapeStyle, Text};
use crate::tools::{HandlerContext, InteractionController, Mode, ToolSettings};
use kurbo::{Point, Rect};

/// The object list plus its snapshot history.
///
/// Objects are drawn in list order; the last one is on top. Every committed
/// change pushes exactly one full snapshot.
#[derive(Debug, Clone)]
pub struct CanvasDocument {
    objects: Vec<Shape>,
    history: History<Vec<Shape>>,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new(Settings::default().history_limit)
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new(history_limit: usize) -> Self {
        Self {
            objects: Vec::new(),
            history: History::new(Vec::new(), history_limit),
        }
    }

    pub fn objects(&self) -> &[Shape] {
        &self.objects
    }

    /// Append a shape and snapshot. Degenerate shapes are dropped.
    pub fn commit_shape(&mut self, shape: Shape) -> bool {
        if shape.is_degenerate() {
            log::debug!("Dropping degenerate {}", shape.kind_name());
            return false;
        }
        log::debug!("Committing {} {}", shape.kind_name(), shape.id());
        self.objects.push(shape);
        self.commit_current();
        true
    }

    /// Replace the object at `index` without snapshotting (live drag).
    pub fn replace(&mut self, index: usize, shape: Shape) {
        if let Some(slot) = self.objects.get_mut(index) {
            *slot = shape;
        }
    }

    /// Snapshot the current object list.
    pub fn commit_current(&mut self) {
        self.history.push(self.objects.clone());
    }

    /// Drop uncommitted live edits, back to the latest snapshot.
    pub fn revert(&mut self) {
        if self.objects != *self.history.current() {
            log::debug!("Reverting uncommitted edits");
            self.objects = self.history.current().clone();
        }
    }

    /// Remove every object (one snapshot).
    pub fn clear(&mut self) {
        self.objects.clear();
        self.commit_current();
    }

    /// Undo the last change. Returns false at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.objects = snapshot.clone();
                log::debug!("Undo -> {} objects", self.objects.len());
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change. Returns false at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.objects = snapshot.clone();
                log::debug!("Redo -> {} objects", self.objects.len());
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Get the bounding box of all shapes.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

/// A canvas: document, view transform, tool settings and mode handlers.
#[derive(Debug)]
pub struct Canvas {
    pub document: CanvasDocument,
    pub view: ViewTransform,
    pub tools: ToolSettings,
    controller: InteractionController,
    zoom_step: f64,
    /// Last pointer position in screen coordinates.
    hover: Option<Point>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Canvas {
    pub fn new(settings: &Settings) -> Self {
        Self {
            document: CanvasDocument::new(settings.history_limit),
            view: ViewTransform::with_limits(settings.min_zoom, settings.max_zoom),
            tools: ToolSettings::from_settings(settings),
            controller: InteractionController::new(),
            zoom_step: settings.zoom_step,
            hover: None,
        }
    }

    pub fn objects(&self) -> &[Shape] {
        self.document.objects()
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    /// Select a mode, discarding any interaction in progress.
    pub fn set_mode(&mut self, mode: Mode) {
        self.controller.set_mode(mode);
        self.document.revert();
    }

    fn dispatch(&mut self, event: PointerEvent) {
        let mut cx = HandlerContext {
            document: &mut self.document,
            view: &mut self.view,
            tools: &self.tools,
        };
        let handler = self.controller.active();
        match event {
            PointerEvent::Down(input) => handler.pointer_down(&mut cx, input),
            PointerEvent::Move(input) => handler.pointer_move(&mut cx, input),
            PointerEvent::Up(input) => handler.pointer_up(&mut cx, input),
        }
    }

    pub fn handle(&mut self, event: PointerEvent) {
        let (PointerEvent::Down(input) | PointerEvent::Move(input) | PointerEvent::Up(input)) = event;
        self.hover = Some(input.position);
        self.dispatch(event);
    }

    pub fn pointer_down(&mut self, input: PointerInput) {
        self.handle(PointerEvent::Down(input));
    }

    pub fn pointer_move(&mut self, input: PointerInput) {
        self.handle(PointerEvent::Move(input));
    }

    pub fn pointer_up(&mut self, input: PointerInput) {
        self.handle(PointerEvent::Up(input));
    }

    /// Pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        self.hover = None;
    }

    pub fn hover(&self) -> Option<Point> {
        self.hover
    }

    /// Zoom around a screen point by `notches` wheel steps (negative zooms out).
    pub fn zoom(&mut self, screen_point: Point, notches: f64) {
        self.view = self.view.zoom_at(screen_point, self.zoom_step.powf(notches));
    }

    /// Uncommitted path or shape for the current interaction.
    pub fn preview(&self) -> Option<Shape> {
        self.controller.preview(&self.tools)
    }

    pub fn is_interacting(&self) -> bool {
        self.controller.is_active()
    }

    /// Index of the object being moved, if any.
    pub fn selected(&self) -> Option<usize> {
        self.controller.selected()
    }

    /// World position of the open text entry.
    pub fn pending_text(&self) -> Option<Point> {
        self.controller.text().pending()
    }

    /// Commit the open text entry. Blank content is discarded.
    pub fn submit_text(&mut self, content: &str) -> bool {
        let Some(position) = self.controller.text_mut().take_pending() else {
            return false;
        };
        let mut text = Text::new(position, content.to_string());
        text.font_size = self.tools.font_size;
        text.style = ShapeStyle::new(self.tools.color, self.tools.line_width);
        self.document.commit_shape(Shape::Text(text))
    }

    pub fn cancel_text(&mut self) {
        self.controller.text_mut().take_pending();
    }

    pub fn undo(&mut self) -> bool {
        self.document.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.document.redo()
    }

    pub fn clear(&mut self) {
        self.document.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::shapes::{Circle, Rectangle, SerializableColor, SolidKind};
    use crate::tools::ShapeKind;
    use kurbo::Vec2;

    fn at(x: f64, y: f64) -> PointerInput {
        PointerInput::new(x, y)
    }

    fn drag(canvas: &mut Canvas, from: (f64, f64), to: (f64, f64)) {
        canvas.pointer_down(at(from.0, from.1));
        canvas.pointer_move(at(to.0, to.1));
        canvas.pointer_up(at(to.0, to.1));
    }

    #[test]
    fn test_draw_path_then_undo() {
        let mut canvas = Canvas::default();
        canvas.tools.color = SerializableColor::rgb(10, 20, 30);
        canvas.tools.line_width = 4.0;
        canvas.set_mode(Mode::Draw);

        canvas.pointer_down(at(10.0, 10.0));
        canvas.pointer_move(at(20.0, 10.0));
        canvas.pointer_move(at(20.0, 20.0));
        canvas.pointer_up(at(20.0, 20.0));

        assert_eq!(canvas.objects().len(), 1);
        let Shape::Freehand(path) = &canvas.objects()[0] else {
            panic!("expected a freehand path");
        };
        assert_eq!(path.points.len(), 3);
        assert_eq!(path.style.color, SerializableColor::rgb(10, 20, 30));
        assert!((path.style.line_width - 4.0).abs() < f64::EPSILON);

        assert!(canvas.undo());
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn test_click_without_move_draws_nothing() {
        let mut canvas = Canvas::default();
        canvas.pointer_down(at(10.0, 10.0));
        canvas.pointer_up(at(10.0, 10.0));
        assert!(canvas.objects().is_empty());
        assert!(!canvas.document.can_undo());
    }

    #[test]
    fn test_rectangle_stamp() {
        let mut canvas = Canvas::default();
        canvas.set_mode(Mode::Shape);
        canvas.tools.shape = ShapeKind::Rectangle;
        canvas.pointer_down(at(0.0, 0.0));
        canvas.pointer_up(at(50.0, 30.0));

        assert_eq!(canvas.objects().len(), 1);
        let Shape::Rectangle(rect) = &canvas.objects()[0] else {
            panic!("expected a rectangle");
        };
        assert_eq!(rect.position, Point::new(0.0, 0.0));
        assert!((rect.width - 50.0).abs() < f64::EPSILON);
        assert!((rect.height - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_degenerate_shape_rejected() {
        let mut canvas = Canvas::default();
        canvas.set_mode(Mode::Shape);
        for kind in [ShapeKind::Line, ShapeKind::Triangle, ShapeKind::Solid(SolidKind::Cone)] {
            canvas.tools.shape = kind;
            canvas.pointer_down(at(25.0, 25.0));
            canvas.pointer_up(at(25.0, 25.0));
        }
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn test_shape_preview_tracks_pointer() {
        let mut canvas = Canvas::default();
        canvas.set_mode(Mode::Shape);
        canvas.tools.shape = ShapeKind::Circle;
        canvas.pointer_down(at(0.0, 0.0));
        assert!(canvas.preview().is_none());
        canvas.pointer_move(at(0.0, 8.0));
        match canvas.preview() {
            Some(Shape::Circle(c)) => assert!((c.radius - 8.0).abs() < 1e-12),
            other => panic!("unexpected preview {other:?}"),
        }
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn test_stamp_uses_world_coordinates() {
        let mut canvas = Canvas::default();
        canvas.view.scale = 2.0;
        canvas.view.offset = Vec2::new(100.0, 0.0);
        canvas.set_mode(Mode::Shape);
        drag(&mut canvas, (100.0, 0.0), (200.0, 60.0));
        let Shape::Rectangle(rect) = &canvas.objects()[0] else {
            panic!("expected a rectangle");
        };
        assert_eq!(rect.position, Point::ZERO);
        assert!((rect.width - 50.0).abs() < 1e-9);
        assert!((rect.height - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_shift_snaps_line() {
        let mut canvas = Canvas::default();
        canvas.set_mode(Mode::Shape);
        canvas.tools.shape = ShapeKind::Line;
        canvas.pointer_down(at(0.0, 0.0));
        canvas.pointer_up(at(100.0, 6.0).with_modifiers(Modifiers::shift()));
        let Shape::Line(line) = &canvas.objects()[0] else {
            panic!("expected a line");
        };
        assert!(line.end.y.abs() < 1e-9);
    }

    #[test]
    fn test_shift_snaps_path_segments() {
        let mut canvas = Canvas::default();
        canvas.pointer_down(at(0.0, 0.0));
        canvas.pointer_move(at(50.0, 47.0).with_modifiers(Modifiers::shift()));
        canvas.pointer_up(at(50.0, 47.0));
        let Shape::Freehand(path) = &canvas.objects()[0] else {
            panic!("expected a path");
        };
        let p = path.points[1];
        assert!((p.x - p.y).abs() < 1e-9);
    }

    #[test]
    fn test_move_translates_and_commits_once() {
        let mut canvas = Canvas::default();
        canvas.document.commit_shape(Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 40.0, 40.0)));
        canvas.document.commit_shape(Shape::Circle(Circle::new(Point::new(100.0, 100.0), 10.0)));
        canvas.set_mode(Mode::Move);

        canvas.pointer_down(at(10.0, 10.0));
        assert_eq!(canvas.selected(), Some(0));
        canvas.pointer_move(at(20.0, 15.0));
        canvas.pointer_move(at(30.0, 25.0));
        canvas.pointer_up(at(30.0, 25.0));
        assert_eq!(canvas.selected(), None);

        let Shape::Rectangle(rect) = &canvas.objects()[0] else {
            panic!("expected a rectangle");
        };
        assert_eq!(rect.position, Point::new(20.0, 15.0));
        assert!((rect.width - 40.0).abs() < f64::EPSILON);

        // One undo restores the pre-move position.
        assert!(canvas.undo());
        assert_eq!(canvas.objects()[0].reference_point(), Point::ZERO);
        assert_eq!(canvas.objects().len(), 2);
    }

    #[test]
    fn test_move_on_empty_space_does_nothing() {
        let mut canvas = Canvas::default();
        canvas.document.commit_shape(Shape::Circle(Circle::new(Point::new(100.0, 100.0), 10.0)));
        canvas.set_mode(Mode::Move);
        drag(&mut canvas, (0.0, 0.0), (50.0, 50.0));
        assert_eq!(canvas.objects()[0].reference_point(), Point::new(100.0, 100.0));
        assert!(!canvas.document.can_redo());
        assert!(canvas.undo());
        assert!(!canvas.undo());
    }

    #[test]
    fn test_hand_pans_in_screen_space() {
        let mut canvas = Canvas::default();
        canvas.view.scale = 4.0;
        canvas.set_mode(Mode::Hand);
        drag(&mut canvas, (10.0, 10.0), (30.0, 5.0));
        assert_eq!(canvas.view.offset, Vec2::new(20.0, -5.0));
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn test_text_submit_and_cancel() {
        let mut canvas = Canvas::default();
        canvas.set_mode(Mode::Text);
        canvas.pointer_down(at(40.0, 50.0));
        canvas.pointer_up(at(40.0, 50.0));
        assert_eq!(canvas.pending_text(), Some(Point::new(40.0, 50.0)));
        assert!(canvas.submit_text("x + 1 = 3"));
        assert_eq!(canvas.pending_text(), None);
        let Shape::Text(text) = &canvas.objects()[0] else {
            panic!("expected text");
        };
        assert_eq!(text.content, "x + 1 = 3");

        canvas.pointer_down(at(0.0, 0.0));
        canvas.cancel_text();
        assert!(!canvas.submit_text("ignored"));
        assert_eq!(canvas.objects().len(), 1);
    }

    #[test]
    fn test_blank_text_discarded() {
        let mut canvas = Canvas::default();
        canvas.set_mode(Mode::Text);
        canvas.pointer_down(at(0.0, 0.0));
        assert!(!canvas.submit_text("   "));
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn test_mode_switch_discards_in_progress_path() {
        let mut canvas = Canvas::default();
        canvas.pointer_down(at(0.0, 0.0));
        canvas.pointer_move(at(10.0, 0.0));
        assert!(canvas.is_interacting());

        canvas.set_mode(Mode::Shape);
        assert!(!canvas.is_interacting());
        canvas.pointer_up(at(10.0, 0.0));
        canvas.set_mode(Mode::Draw);
        canvas.pointer_move(at(20.0, 0.0));
        canvas.pointer_up(at(20.0, 0.0));
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn test_mode_switch_mid_move_restores_object() {
        let mut canvas = Canvas::default();
        canvas.document.commit_shape(Shape::Circle(Circle::new(Point::new(10.0, 10.0), 5.0)));
        canvas.set_mode(Mode::Move);
        canvas.pointer_down(at(10.0, 10.0));
        canvas.pointer_move(at(40.0, 10.0));
        assert_eq!(canvas.objects()[0].reference_point(), Point::new(40.0, 10.0));

        canvas.set_mode(Mode::Draw);
        assert_eq!(canvas.objects()[0].reference_point(), Point::new(10.0, 10.0));
        assert!(!canvas.document.can_redo());
        canvas.undo();
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn test_erase_appends_paint() {
        let mut canvas = Canvas::default();
        canvas.tools.eraser_size = 12.0;
        drag(&mut canvas, (0.0, 0.0), (10.0, 0.0));
        canvas.set_mode(Mode::Erase);
        drag(&mut canvas, (0.0, 0.0), (10.0, 0.0));
        assert_eq!(canvas.objects().len(), 2);
        let Shape::Freehand(eraser) = &canvas.objects()[1] else {
            panic!("expected eraser path");
        };
        assert!(eraser.is_eraser());
        assert!((eraser.style.line_width - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut canvas = Canvas::default();
        drag(&mut canvas, (0.0, 0.0), (10.0, 0.0));
        canvas.clear();
        assert!(canvas.objects().is_empty());
        assert!(canvas.undo());
        assert_eq!(canvas.objects().len(), 1);
        assert!(canvas.redo());
        assert!(canvas.objects().is_empty());
    }

    #[test]
    fn test_wheel_zoom_anchored() {
        let mut canvas = Canvas::default();
        let cursor = Point::new(200.0, 150.0);
        let world = canvas.view.to_world(cursor);
        canvas.zoom(cursor, 3.0);
        assert!(canvas.view.scale > 1.0);
        let back = canvas.view.to_screen(world);
        assert!((back.x - cursor.x).abs() < 1e-9 && (back.y - cursor.y).abs() < 1e-9);
    }

    #[test]
    fn test_document_bounds() {
        let mut doc = CanvasDocument::default();
        assert!(doc.bounds().is_none());
        doc.commit_shape(Shape::Rectangle(Rectangle::new(Point::new(0.0, 0.0), 10.0, 10.0)));
        doc.commit_shape(Shape::Circle(Circle::new(Point::new(30.0, 30.0), 5.0)));
        assert_eq!(doc.bounds(), Some(Rect::new(0.0, 0.0, 35.0, 35.0)));
    }
}
