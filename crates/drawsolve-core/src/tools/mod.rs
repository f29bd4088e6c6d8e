//! Interaction modes and their pointer handlers.

mod grab;
mod pan;
mod path;
mod stamp;
mod text;

pub use grab::MoveHandler;
pub use pan::HandHandler;
pub use path::PathHandler;
pub use stamp::ShapeHandler;
pub use text::TextHandler;

use crate::camera::ViewTransform;
use crate::canvas::CanvasDocument;
use crate::config::Settings;
use crate::input::PointerInput;
use crate::shapes::{
    Arrow, BlendMode, Circle, Ellipse, Line, Polygon, Rectangle, SerializableColor, Shape,
    ShapeStyle, Solid, SolidKind, Triangle,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interaction mode selected from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Draw,
    Erase,
    Shape,
    Move,
    Text,
    Hand,
}

impl Mode {
    pub const ALL: [Mode; 6] = [Mode::Draw, Mode::Erase, Mode::Shape, Mode::Move, Mode::Text, Mode::Hand];
}

/// What the shape mode stamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Line,
    Arrow,
    #[default]
    Rectangle,
    Circle,
    Ellipse,
    Triangle,
    Polygon,
    Solid(SolidKind),
}

impl ShapeKind {
    /// Kinds whose release point snaps to 45° with Shift.
    pub fn is_segment(self) -> bool {
        matches!(self, ShapeKind::Line | ShapeKind::Arrow)
    }
}

/// Current tool settings applied to new objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
    pub color: SerializableColor,
    pub line_width: f64,
    pub eraser_size: f64,
    pub font_size: f64,
    pub shape: ShapeKind,
    pub polygon_sides: usize,
}

impl ToolSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            color: settings.stroke_color,
            line_width: settings.line_width,
            eraser_size: settings.eraser_size,
            font_size: settings.font_size,
            shape: ShapeKind::default(),
            polygon_sides: settings.polygon_sides,
        }
    }

    pub fn style(&self) -> ShapeStyle {
        ShapeStyle::new(self.color, self.line_width)
    }

    /// Style for a path in the given blend; erasers use the eraser size.
    pub fn path_style(&self, blend: BlendMode) -> ShapeStyle {
        match blend {
            BlendMode::Normal => self.style(),
            BlendMode::Erase => ShapeStyle::new(self.color, self.eraser_size),
        }
    }

    /// Build the current shape kind from an anchor→current drag.
    pub fn stamp(&self, anchor: Point, current: Point) -> Shape {
        let mut shape = match self.shape {
            ShapeKind::Line => Shape::Line(Line::new(anchor, current)),
            ShapeKind::Arrow => Shape::Arrow(Arrow::new(anchor, current)),
            ShapeKind::Rectangle => Shape::Rectangle(Rectangle::from_drag(anchor, current)),
            ShapeKind::Circle => Shape::Circle(Circle::from_drag(anchor, current)),
            ShapeKind::Ellipse => Shape::Ellipse(Ellipse::from_drag(anchor, current)),
            ShapeKind::Triangle => Shape::Triangle(Triangle::from_drag(anchor, current)),
            ShapeKind::Polygon => Shape::Polygon(Polygon::regular(
                anchor,
                (current - anchor).hypot(),
                self.polygon_sides,
            )),
            ShapeKind::Solid(kind) => Shape::Solid(Solid::from_drag(kind, anchor, current)),
        };
        *shape.style_mut() = self.style();
        shape
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Mutable state a handler may touch while processing one event.
pub struct HandlerContext<'a> {
    pub document: &'a mut CanvasDocument,
    pub view: &'a mut ViewTransform,
    pub tools: &'a ToolSettings,
}

/// Pointer handling for one mode.
pub trait ModeHandler: fmt::Debug {
    fn pointer_down(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput);

    fn pointer_move(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput);

    fn pointer_up(&mut self, cx: &mut HandlerContext<'_>, input: PointerInput);

    /// Uncommitted object to overlay while the interaction runs.
    fn preview(&self, _tools: &ToolSettings) -> Option<Shape> {
        None
    }

    /// Whether an interaction is in progress.
    fn is_active(&self) -> bool;

    /// Drop any in-progress state without committing.
    fn cancel(&mut self);
}

/// One handler per mode, selected by the active [`Mode`].
#[derive(Debug)]
pub struct InteractionController {
    mode: Mode,
    draw: PathHandler,
    erase: PathHandler,
    shape: ShapeHandler,
    grab: MoveHandler,
    text: TextHandler,
    hand: HandHandler,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            draw: PathHandler::new(BlendMode::Normal),
            erase: PathHandler::new(BlendMode::Erase),
            shape: ShapeHandler::default(),
            grab: MoveHandler::default(),
            text: TextHandler::default(),
            hand: HandHandler::default(),
        }
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switch mode. Whatever the previous mode had in progress is discarded.
    pub fn set_mode(&mut self, mode: Mode) {
        let previous = self.mode;
        let current = self.handler_mut(previous);
        if current.is_active() {
            log::debug!("Discarding in-progress {previous:?} interaction");
        }
        current.cancel();
        self.mode = mode;
    }

    pub fn handler(&self, mode: Mode) -> &dyn ModeHandler {
        match mode {
            Mode::Draw => &self.draw,
            Mode::Erase => &self.erase,
            Mode::Shape => &self.shape,
            Mode::Move => &self.grab,
            Mode::Text => &self.text,
            Mode::Hand => &self.hand,
        }
    }

    pub fn handler_mut(&mut self, mode: Mode) -> &mut dyn ModeHandler {
        match mode {
            Mode::Draw => &mut self.draw,
            Mode::Erase => &mut self.erase,
            Mode::Shape => &mut self.shape,
            Mode::Move => &mut self.grab,
            Mode::Text => &mut self.text,
            Mode::Hand => &mut self.hand,
        }
    }

    pub fn active(&mut self) -> &mut dyn ModeHandler {
        self.handler_mut(self.mode)
    }

    pub fn is_active(&self) -> bool {
        self.handler(self.mode).is_active()
    }

    pub fn preview(&self, tools: &ToolSettings) -> Option<Shape> {
        self.handler(self.mode).preview(tools)
    }

    pub fn text(&self) -> &TextHandler {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextHandler {
        &mut self.text
    }

    /// Index of the object held in move mode.
    pub fn selected(&self) -> Option<usize> {
        self.grab.selected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_applies_style() {
        let tools = ToolSettings {
            color: SerializableColor::rgb(200, 0, 0),
            line_width: 7.0,
            shape: ShapeKind::Circle,
            ..ToolSettings::default()
        };
        let shape = tools.stamp(Point::ZERO, Point::new(3.0, 4.0));
        assert_eq!(shape.style().color, SerializableColor::rgb(200, 0, 0));
        assert!((shape.style().line_width - 7.0).abs() < f64::EPSILON);
        match shape {
            Shape::Circle(c) => assert!((c.radius - 5.0).abs() < 1e-12),
            other => panic!("expected circle, got {other:?}"),
        }
    }

    #[test]
    fn test_every_kind_degenerate_on_click() {
        let mut kinds = vec![
            ShapeKind::Line,
            ShapeKind::Arrow,
            ShapeKind::Rectangle,
            ShapeKind::Circle,
            ShapeKind::Ellipse,
            ShapeKind::Triangle,
            ShapeKind::Polygon,
        ];
        kinds.extend(SolidKind::ALL.map(ShapeKind::Solid));
        for kind in kinds {
            let tools = ToolSettings { shape: kind, ..ToolSettings::default() };
            let p = Point::new(12.0, 34.0);
            assert!(tools.stamp(p, p).is_degenerate(), "{kind:?}");
        }
    }

    #[test]
    fn test_eraser_style_uses_eraser_size() {
        let tools = ToolSettings { eraser_size: 25.0, ..ToolSettings::default() };
        assert!((tools.path_style(BlendMode::Erase).line_width - 25.0).abs() < f64::EPSILON);
        assert!((tools.path_style(BlendMode::Normal).line_width - tools.line_width).abs() < f64::EPSILON);
    }

    #[test]
    fn test_controller_lookup_covers_all_modes() {
        let mut controller = InteractionController::new();
        for mode in Mode::ALL {
            controller.set_mode(mode);
            assert_eq!(controller.mode(), mode);
            assert!(!controller.is_active());
        }
    }

    #[test]
    fn test_shape_kind_serde() {
        let json = serde_json::to_string(&ShapeKind::Solid(SolidKind::HexagonalPrism)).unwrap();
        assert_eq!(json, r#"{"solid":"hexagonal_prism"}"#);
        let kind: ShapeKind = serde_json::from_str(r#""rectangle""#).unwrap();
        assert_eq!(kind, ShapeKind::Rectangle);
    }
}
