//! PNG export.

use crate::raster::RasterSurface;
use crate::renderer::{RenderContext, Renderer, RendererError, SurfaceRenderer};
use base64::{Engine, engine::general_purpose::STANDARD};
use drawsolve_core::canvas::Canvas;
use kurbo::Size;
use peniko::Color;
use thiserror::Error;

pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] png::EncodingError),
}

/// Render the committed objects of the visible viewport to a raster.
pub fn render_canvas(canvas: &Canvas, width: u32, height: u32, background: Color) -> Result<RasterSurface, ExportError> {
    let surface = RasterSurface::new(width, height)?;
    let ctx = RenderContext::new(canvas, Size::new(f64::from(width), f64::from(height)))
        .with_background(background)
        .for_export();
    let mut renderer = SurfaceRenderer::new(surface);
    renderer.build_scene(&ctx);
    Ok(renderer.into_surface())
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}

pub fn png_data_url(png_data: &[u8]) -> String {
    format!("{PNG_DATA_URL_PREFIX}{}", STANDARD.encode(png_data))
}

/// Render and encode the canvas as PNG bytes.
pub fn export_png(canvas: &Canvas, width: u32, height: u32, background: Color) -> Result<Vec<u8>, ExportError> {
    let surface = render_canvas(canvas, width, height, background)?;
    let png_data = encode_png(&surface.to_rgba8(), width, height)?;
    log::info!("PNG export complete: {} bytes", png_data.len());
    Ok(png_data)
}

/// Render the canvas as a `data:image/png;base64,...` URL.
pub fn export_data_url(canvas: &Canvas, width: u32, height: u32, background: Color) -> Result<String, ExportError> {
    Ok(png_data_url(&export_png(canvas, width, height, background)?))
}
