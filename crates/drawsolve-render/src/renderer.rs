//! Renderer trait abstraction.

use drawsolve_core::canvas::Canvas;
use drawsolve_core::config::{GridStyle, Settings};
use drawsolve_core::shapes::Shape;
use drawsolve_core::tools::Mode;
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Shape as _, Size, Stroke};
use peniko::Color;
use thiserror::Error;

use crate::paths::shape_path;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Failed to load font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),
}

/// How a layer is merged into what is beneath it when popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Composite {
    /// Paint over.
    #[default]
    SourceOver,
    /// Remove paint where the layer has coverage.
    DestinationOut,
}

/// A 2D drawing target. Paths are given in their own space and mapped by
/// `transform`; stroke widths scale with it.
pub trait Surface {
    fn clear(&mut self, color: Color);

    fn stroke(&mut self, style: &Stroke, transform: Affine, color: Color, path: &BezPath);

    /// Non-zero fill.
    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath);

    /// Start an isolated layer; drawing goes there until [`Surface::pop_layer`].
    fn push_layer(&mut self, composite: Composite);

    fn pop_layer(&mut self);

    /// Draw a line of text with its top-left corner at `origin`.
    fn text(&mut self, transform: Affine, origin: Point, content: &str, size: f64, color: Color);
}

/// Grid spacing band. The world spacing doubles or halves with zoom so the
/// on-screen spacing stays inside `[min_px, max_px]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpacing {
    pub base: f64,
    pub min_px: f64,
    pub max_px: f64,
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl GridSpacing {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            base: settings.grid_spacing,
            min_px: settings.grid_min_px,
            max_px: settings.grid_max_px,
        }
    }

    /// World-space spacing to use at `scale`. A band that cannot bound the
    /// line count leaves the base spacing unchanged.
    pub fn at_scale(&self, scale: f64) -> f64 {
        let mut spacing = self.base;
        let band_ok = self.min_px > 0.0 && self.min_px.is_finite() && self.max_px >= self.min_px * 2.0;
        if !(spacing > 0.0 && scale > 0.0 && band_ok) {
            return self.base;
        }
        while spacing * scale < self.min_px {
            spacing *= 2.0;
        }
        while spacing * scale > self.max_px && spacing * scale / 2.0 >= self.min_px {
            spacing /= 2.0;
        }
        spacing
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The canvas to render.
    pub canvas: &'a Canvas,
    /// Viewport size in pixels.
    pub viewport_size: Size,
    pub background_color: Color,
    pub grid_style: GridStyle,
    pub grid_spacing: GridSpacing,
    pub grid_color: Color,
    /// Draw the in-progress path or shape.
    pub show_preview: bool,
    /// Draw cursor decorations at the hover position.
    pub show_cursor: bool,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(canvas: &'a Canvas, viewport_size: Size) -> Self {
        Self {
            canvas,
            viewport_size,
            background_color: Color::WHITE,
            grid_style: GridStyle::Lines,
            grid_spacing: GridSpacing::default(),
            grid_color: Color::from_rgba8(200, 200, 200, 100),
            show_preview: true,
            show_cursor: true,
        }
    }

    /// Context using the configured background and grid band.
    pub fn from_settings(canvas: &'a Canvas, viewport_size: Size, settings: &Settings) -> Self {
        Self::new(canvas, viewport_size)
            .with_background(settings.background.into())
            .with_grid(settings.grid_style)
            .with_grid_spacing(GridSpacing::from_settings(settings))
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the grid style.
    pub fn with_grid(mut self, style: GridStyle) -> Self {
        self.grid_style = style;
        self
    }

    pub fn with_grid_spacing(mut self, spacing: GridSpacing) -> Self {
        self.grid_spacing = spacing;
        self
    }

    /// Objects only: no grid, preview or cursor. Used for export.
    pub fn for_export(mut self) -> Self {
        self.grid_style = GridStyle::None;
        self.show_preview = false;
        self.show_cursor = false;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Build the drawing commands for one frame.
    fn build_scene(&mut self, ctx: &RenderContext);
}

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub culled: usize,
}

/// Renders a canvas onto any [`Surface`].
#[derive(Debug, Default)]
pub struct SurfaceRenderer<S> {
    surface: S,
    zoom: f64,
    stats: FrameStats,
}

const PREVIEW_DASH: [f64; 2] = [6.0, 4.0];
const CROSSHAIR_ARM: f64 = 8.0;

impl<S: Surface> SurfaceRenderer<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            zoom: 1.0,
            stats: FrameStats::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Counters from the last [`Renderer::build_scene`].
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    fn shape_stroke(&self, shape: &Shape) -> Stroke {
        Stroke::new(shape.style().line_width)
            .with_caps(Cap::Round)
            .with_join(Join::Round)
    }

    /// Draw one object. `dashed` is used for uncommitted shapes.
    pub fn render_shape(&mut self, shape: &Shape, transform: Affine, dashed: bool) {
        let color = shape.style().stroke();
        match shape {
            Shape::Text(text) => {
                self.surface
                    .text(transform, text.position, &text.content, text.font_size, color);
            }
            Shape::Freehand(path) if path.is_eraser() => {
                // Opaque paint in a destination-out layer cuts through what is below.
                let stroke = self.shape_stroke(shape);
                self.surface.push_layer(Composite::DestinationOut);
                self.surface.stroke(&stroke, transform, Color::BLACK, &shape_path(shape));
                self.surface.pop_layer();
            }
            _ => {
                let mut stroke = self.shape_stroke(shape);
                if dashed {
                    let pattern = PREVIEW_DASH.map(|d| d / self.zoom);
                    stroke = stroke.with_dashes(0.0, pattern);
                }
                self.surface.stroke(&stroke, transform, color, &shape_path(shape));
            }
        }
    }

    fn render_grid(&mut self, ctx: &RenderContext, visible: Rect, transform: Affine) {
        let spacing = ctx.grid_spacing.at_scale(self.zoom);
        let start_x = (visible.x0 / spacing).floor() * spacing;
        let start_y = (visible.y0 / spacing).floor() * spacing;
        let end_x = (visible.x1 / spacing).ceil() * spacing;
        let end_y = (visible.y1 / spacing).ceil() * spacing;

        let mut path = BezPath::new();
        match ctx.grid_style {
            GridStyle::None => return,
            GridStyle::Lines => {
                let mut x = start_x;
                while x <= end_x {
                    path.move_to(Point::new(x, start_y));
                    path.line_to(Point::new(x, end_y));
                    x += spacing;
                }
                let mut y = start_y;
                while y <= end_y {
                    path.move_to(Point::new(start_x, y));
                    path.line_to(Point::new(end_x, y));
                    y += spacing;
                }
                let stroke = Stroke::new(0.5 / self.zoom);
                self.surface.stroke(&stroke, transform, ctx.grid_color, &path);
            }
            GridStyle::Dots => {
                let half = 1.5 / self.zoom;
                let mut x = start_x;
                while x <= end_x {
                    let mut y = start_y;
                    while y <= end_y {
                        path.extend(Rect::new(x - half, y - half, x + half, y + half).path_elements(0.1));
                        y += spacing;
                    }
                    x += spacing;
                }
                self.surface.fill(transform, ctx.grid_color, &path);
            }
        }
    }

    /// Cursor decorations, drawn in screen space.
    fn render_cursor(&mut self, ctx: &RenderContext, screen: Point) {
        let stroke = Stroke::new(1.0);
        let color = Color::from_rgba8(100, 100, 100, 200);
        match ctx.canvas.mode() {
            Mode::Erase => {
                let radius = ctx.canvas.tools.eraser_size / 2.0 * self.zoom;
                let ring = kurbo::Circle::new(screen, radius).to_path(0.1);
                self.surface.stroke(&stroke, Affine::IDENTITY, color, &ring);
            }
            Mode::Draw | Mode::Shape => {
                let mut cross = BezPath::new();
                cross.move_to(Point::new(screen.x - CROSSHAIR_ARM, screen.y));
                cross.line_to(Point::new(screen.x + CROSSHAIR_ARM, screen.y));
                cross.move_to(Point::new(screen.x, screen.y - CROSSHAIR_ARM));
                cross.line_to(Point::new(screen.x, screen.y + CROSSHAIR_ARM));
                self.surface.stroke(&stroke, Affine::IDENTITY, color, &cross);
            }
            Mode::Move | Mode::Text | Mode::Hand => {}
        }
    }
}

/// Bounding boxes overlap, counting touching edges. Works for zero-area boxes.
fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

impl<S: Surface> Renderer for SurfaceRenderer<S> {
    fn build_scene(&mut self, ctx: &RenderContext) {
        let view = &ctx.canvas.view;
        self.zoom = view.scale;
        self.stats = FrameStats::default();
        let transform = view.transform();
        let visible = view.visible_world_rect(ctx.viewport_size);

        self.surface.clear(ctx.background_color);
        self.render_grid(ctx, visible, transform);

        // Objects go in their own layer so erase paint cannot cut the background.
        self.surface.push_layer(Composite::SourceOver);
        for shape in ctx.canvas.objects() {
            let half_width = shape.style().line_width / 2.0;
            if !overlaps(shape.bounds().inflate(half_width, half_width), visible) {
                self.stats.culled += 1;
                continue;
            }
            self.render_shape(shape, transform, false);
            self.stats.drawn += 1;
        }
        if ctx.show_preview {
            if let Some(preview) = ctx.canvas.preview() {
                let dashed = !matches!(preview, Shape::Freehand(_));
                self.render_shape(&preview, transform, dashed);
            }
        }
        self.surface.pop_layer();

        if ctx.show_cursor {
            if let Some(screen) = ctx.canvas.hover() {
                self.render_cursor(ctx, screen);
            }
        }
    }
}
