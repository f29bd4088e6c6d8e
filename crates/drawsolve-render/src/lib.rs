//! Draw & Solve Render Library
//!
//! Renderer abstraction for the Draw & Solve canvas, plus a software raster
//! surface used for PNG export.

mod glyphs;
mod paths;
mod renderer;

pub mod export;
pub mod frame;
pub mod raster;
pub mod recording;

pub use drawsolve_core::config::GridStyle;
pub use export::{ExportError, export_data_url, export_png, png_data_url};
pub use frame::FrameScheduler;
pub use glyphs::TextOutliner;
pub use paths::shape_path;
pub use raster::RasterSurface;
pub use recording::{DrawOp, RecordingSurface};
pub use renderer::{
    Composite, FrameStats, GridSpacing, RenderContext, Renderer, RendererError, Surface, SurfaceRenderer,
};
