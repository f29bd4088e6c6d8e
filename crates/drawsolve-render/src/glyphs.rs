//! Glyph outlines for text objects.

use crate::renderer::RendererError;
use ab_glyph::{Font, FontRef, GlyphId, OutlineCurve};
use kurbo::{BezPath, Point};

static DEJAVU_SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Turns a line of text into fillable outlines using the embedded font.
#[derive(Debug, Clone)]
pub struct TextOutliner {
    font: FontRef<'static>,
}

impl TextOutliner {
    pub fn embedded() -> Result<Self, RendererError> {
        Self::from_bytes(DEJAVU_SANS)
    }

    /// Outline text with a TrueType or OpenType font held for the whole program.
    pub fn from_bytes(data: &'static [u8]) -> Result<Self, RendererError> {
        Ok(Self {
            font: FontRef::try_from_slice(data)?,
        })
    }

    fn units_per_em(&self) -> f64 {
        f64::from(self.font.units_per_em().unwrap_or(1000.0))
    }

    /// Outlines of `content` at `size` units per em. The origin is the
    /// top-left of the line box and y grows downwards.
    pub fn outline(&self, content: &str, size: f64) -> BezPath {
        let scale = size / self.units_per_em();
        let ascent = f64::from(self.font.ascent_unscaled());
        let mut path = BezPath::new();
        let mut pen = 0.0;
        let mut previous: Option<GlyphId> = None;

        for c in content.chars().filter(|c| !c.is_control()) {
            let id = self.font.glyph_id(c);
            if let Some(prev) = previous {
                pen += f64::from(self.font.kern_unscaled(prev, id));
            }
            if let Some(outline) = self.font.outline(id) {
                let map = |p: ab_glyph::Point| Point::new((pen + f64::from(p.x)) * scale, (ascent - f64::from(p.y)) * scale);
                let mut last: Option<Point> = None;
                for curve in &outline.curves {
                    let (start, end) = match curve {
                        OutlineCurve::Line(a, b) | OutlineCurve::Quad(a, _, b) | OutlineCurve::Cubic(a, _, _, b) => {
                            (map(*a), map(*b))
                        }
                    };
                    // A curve that does not continue the previous one starts a new contour.
                    if last.is_none_or(|l| l.distance(start) > 1e-9) {
                        if last.is_some() {
                            path.close_path();
                        }
                        path.move_to(start);
                    }
                    match curve {
                        OutlineCurve::Line(_, _) => path.line_to(end),
                        OutlineCurve::Quad(_, c1, _) => path.quad_to(map(*c1), end),
                        OutlineCurve::Cubic(_, c1, c2, _) => path.curve_to(map(*c1), map(*c2), end),
                    }
                    last = Some(end);
                }
                if last.is_some() {
                    path.close_path();
                }
            }
            pen += f64::from(self.font.h_advance_unscaled(id));
            previous = Some(id);
        }
        path
    }

    /// Horizontal advance of `content` at `size`.
    pub fn advance(&self, content: &str, size: f64) -> f64 {
        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for c in content.chars().filter(|c| !c.is_control()) {
            let id = self.font.glyph_id(c);
            if let Some(prev) = previous {
                width += f64::from(self.font.kern_unscaled(prev, id));
            }
            width += f64::from(self.font.h_advance_unscaled(id));
            previous = Some(id);
        }
        width * size / self.units_per_em()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape as _;

    #[test]
    fn test_outline_sits_in_line_box() {
        let outliner = TextOutliner::embedded().unwrap();
        let path = outliner.outline("x + 1", 20.0);
        let bounds = path.bounding_box();
        assert!(bounds.x0 >= -1.0);
        assert!(bounds.y0 >= 0.0);
        assert!(bounds.y1 <= 24.0);
        assert!(bounds.x1 <= outliner.advance("x + 1", 20.0) + 1.0);
        assert!(bounds.area() > 0.0);
    }

    #[test]
    fn test_spaces_have_advance_but_no_ink() {
        let outliner = TextOutliner::embedded().unwrap();
        assert!(outliner.outline("   ", 20.0).elements().is_empty());
        assert!(outliner.advance("   ", 20.0) > 0.0);
        assert!((outliner.advance("ab", 40.0) - 2.0 * outliner.advance("ab", 20.0)).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_font_is_an_error() {
        let err = TextOutliner::from_bytes(b"not a font").unwrap_err();
        assert!(matches!(err, RendererError::Font(_)));
    }
}
