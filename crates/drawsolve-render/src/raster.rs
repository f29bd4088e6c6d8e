//! CPU raster surface.
//!
//! Strokes are converted to outlines with `kurbo::stroke` and everything is
//! filled with an anti-aliased non-zero scanline fill. Pixels are premultiplied
//! RGBA in `f32`. Text is filled from glyph outlines of the embedded font.

use crate::glyphs::TextOutliner;
use crate::renderer::{Composite, RendererError, Surface};
use kurbo::{Affine, BezPath, PathEl, Point, Stroke, StrokeOpts};
use peniko::Color;

/// Sub-scanlines sampled per pixel row.
const SUBSAMPLES: usize = 4;
/// Largest accepted edge length in pixels.
pub const MAX_DIMENSION: u32 = 16_384;
/// Flattening tolerance in device pixels.
const DEVICE_TOLERANCE: f64 = 0.1;

type Pixel = [f32; 4];

struct Layer {
    pixels: Vec<Pixel>,
    composite: Composite,
}

#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

/// Software rendering target.
pub struct RasterSurface {
    width: u32,
    height: u32,
    layers: Vec<Layer>,
    outliner: TextOutliner,
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layers", &self.layers.len())
            .finish()
    }
}

fn premultiply(color: Color) -> Pixel {
    let c = color.to_rgba8();
    let a = f32::from(c.a) / 255.0;
    [
        f32::from(c.r) / 255.0 * a,
        f32::from(c.g) / 255.0 * a,
        f32::from(c.b) / 255.0 * a,
        a,
    ]
}

fn source_over(dst: &mut Pixel, src: Pixel) {
    let keep = 1.0 - src[3];
    for i in 0..4 {
        dst[i] = src[i] + dst[i] * keep;
    }
}

fn destination_out(dst: &mut Pixel, src: Pixel) {
    let keep = 1.0 - src[3];
    for channel in dst.iter_mut() {
        *channel *= keep;
    }
}

/// Scale factor a transform applies to lengths (geometric mean of the axes).
fn transform_scale(transform: Affine) -> f64 {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    (a * d - b * c).abs().sqrt()
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, RendererError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RendererError::InvalidSize { width, height });
        }
        let pixels = vec![[0.0; 4]; width as usize * height as usize];
        Ok(Self {
            outliner: TextOutliner::embedded()?,
            width,
            height,
            layers: vec![Layer {
                pixels,
                composite: Composite::SourceOver,
            }],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn top(&mut self) -> &mut Layer {
        let last = self.layers.len() - 1;
        &mut self.layers[last]
    }

    /// Straight-alpha RGBA8 of the base layer at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(unpremultiply(self.layers[0].pixels[(y * self.width + x) as usize]))
    }

    /// Straight-alpha RGBA8 rows of the base layer. Open layers are ignored.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.layers[0]
            .pixels
            .iter()
            .flat_map(|p| unpremultiply(*p))
            .collect()
    }

    /// Coverage (0..=1 per pixel) of a path already in device space.
    fn coverage(&self, path: &BezPath) -> Vec<f32> {
        let mut edges = Vec::new();
        let mut start = Point::ZERO;
        let mut last = Point::ZERO;
        let push = |a: Point, b: Point, edges: &mut Vec<Edge>| {
            if a.y != b.y {
                edges.push(Edge { x0: a.x, y0: a.y, x1: b.x, y1: b.y });
            }
        };
        kurbo::flatten(path.iter(), DEVICE_TOLERANCE, |el| match el {
            PathEl::MoveTo(p) => {
                push(last, start, &mut edges);
                start = p;
                last = p;
            }
            PathEl::LineTo(p) => {
                push(last, p, &mut edges);
                last = p;
            }
            PathEl::ClosePath => {
                push(last, start, &mut edges);
                last = start;
            }
            // flatten only emits lines
            PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
        });
        push(last, start, &mut edges);

        let (w, h) = (self.width as usize, self.height as usize);
        let mut cov = vec![0.0f32; w * h];
        if edges.is_empty() {
            return cov;
        }
        let min_y = edges.iter().map(|e| e.y0.min(e.y1)).fold(f64::INFINITY, f64::min);
        let max_y = edges.iter().map(|e| e.y0.max(e.y1)).fold(f64::NEG_INFINITY, f64::max);
        let row_start = min_y.floor().max(0.0) as usize;
        let row_end = (max_y.ceil().max(0.0) as usize).min(h);

        let weight = 1.0 / SUBSAMPLES as f32;
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for row in row_start..row_end {
            let line = &mut cov[row * w..(row + 1) * w];
            for sub in 0..SUBSAMPLES {
                let y = row as f64 + (sub as f64 + 0.5) / SUBSAMPLES as f64;
                crossings.clear();
                for e in &edges {
                    let (lo, hi, dir) = if e.y0 < e.y1 { (e.y0, e.y1, 1) } else { (e.y1, e.y0, -1) };
                    if y >= lo && y < hi {
                        let x = e.x0 + (y - e.y0) * (e.x1 - e.x0) / (e.y1 - e.y0);
                        crossings.push((x, dir));
                    }
                }
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
                let mut winding = 0;
                for pair in crossings.windows(2) {
                    winding += pair[0].1;
                    if winding != 0 {
                        add_span(line, pair[0].0, pair[1].0, weight);
                    }
                }
            }
        }
        cov
    }

    fn paint(&mut self, coverage: &[f32], color: Color) {
        let src = premultiply(color);
        let layer = self.top();
        for (pixel, &c) in layer.pixels.iter_mut().zip(coverage) {
            if c <= 0.0 {
                continue;
            }
            let c = c.min(1.0);
            source_over(pixel, [src[0] * c, src[1] * c, src[2] * c, src[3] * c]);
        }
    }
}

/// Add horizontal coverage for `[xa, xb)` to one pixel row.
fn add_span(line: &mut [f32], xa: f64, xb: f64, weight: f32) {
    let width = line.len() as f64;
    let (xa, xb) = (xa.clamp(0.0, width), xb.clamp(0.0, width));
    if xb <= xa {
        return;
    }
    let first = xa.floor() as usize;
    let last = xb.ceil() as usize;
    for (x, cell) in line.iter_mut().enumerate().take(last).skip(first) {
        let left = xa.max(x as f64);
        let right = xb.min(x as f64 + 1.0);
        if right > left {
            *cell += weight * (right - left) as f32;
        }
    }
}

fn unpremultiply(p: Pixel) -> [u8; 4] {
    let a = p[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |v: f32| ((v / a).clamp(0.0, 1.0) * 255.0).round() as u8;
    [channel(p[0]), channel(p[1]), channel(p[2]), (a * 255.0).round() as u8]
}

impl Surface for RasterSurface {
    fn clear(&mut self, color: Color) {
        let pixel = premultiply(color);
        self.top().pixels.fill(pixel);
    }

    fn stroke(&mut self, style: &Stroke, transform: Affine, color: Color, path: &BezPath) {
        if style.width <= 0.0 {
            return;
        }
        let scale = transform_scale(transform).max(f64::EPSILON);
        let outline = kurbo::stroke(path.iter(), style, &StrokeOpts::default(), DEVICE_TOLERANCE / scale);
        let device = transform * outline;
        let coverage = self.coverage(&device);
        self.paint(&coverage, color);
    }

    fn fill(&mut self, transform: Affine, color: Color, path: &BezPath) {
        let device = transform * path.clone();
        let coverage = self.coverage(&device);
        self.paint(&coverage, color);
    }

    fn push_layer(&mut self, composite: Composite) {
        let pixels = vec![[0.0; 4]; self.width as usize * self.height as usize];
        self.layers.push(Layer { pixels, composite });
    }

    fn pop_layer(&mut self) {
        if self.layers.len() < 2 {
            log::warn!("pop_layer without a matching push_layer");
            return;
        }
        let Some(layer) = self.layers.pop() else { return };
        let below = self.top();
        let merge = match layer.composite {
            Composite::SourceOver => source_over,
            Composite::DestinationOut => destination_out,
        };
        for (dst, src) in below.pixels.iter_mut().zip(layer.pixels) {
            if src[3] > 0.0 {
                merge(dst, src);
            }
        }
    }

    fn text(&mut self, transform: Affine, origin: Point, content: &str, size: f64, color: Color) {
        let glyphs = self.outliner.outline(content, size);
        if glyphs.elements().is_empty() {
            return;
        }
        self.fill(transform * Affine::translate(origin.to_vec2()), color, &glyphs);
    }
}
