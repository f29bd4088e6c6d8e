//! Scripted canvas session.
//!
//! A script is a JSON list of host actions (pointer events, tool changes, key
//! presses, solve, import). The session applies them in order to one canvas,
//! which stands in for the browser page that normally feeds those events.

use crate::shortcuts::{KeyAction, ShortcutRegistry};
use drawsolve_core::canvas::Canvas;
use drawsolve_core::config::{ConfigError, Settings, is_positive};
use drawsolve_core::import::{BoundsLoader, LoadOutcome, import_model_file};
use drawsolve_core::input::{Modifiers, PointerInput};
use drawsolve_core::scene3d::{OrbitCamera, SceneDrag, SceneMapping, SceneNode, mirror_objects};
use drawsolve_core::shapes::{ParseColorError, SerializableColor};
use drawsolve_core::solve::{SimulatedSolver, SolveError, SolveSession, SolveState, Solver};
use drawsolve_core::tools::{Mode, ShapeKind};
use drawsolve_core::typeset::InlineMarkup;
use drawsolve_render::{
    ExportError, FrameScheduler, FrameStats, RecordingSurface, RenderContext, Renderer, SurfaceRenderer, export_data_url,
    export_png,
};
use glam::Vec2;
use kurbo::{Point, Size};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Script errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid color: {0}")]
    Color(#[from] ParseColorError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Solve(#[from] SolveError),
    #[error("{what} must be positive and finite, got {value}")]
    InvalidWidth { what: &'static str, value: f64 },
    #[error("No script given")]
    MissingScript,
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

/// A recorded sequence of host actions.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Viewport size in pixels; also the export size.
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// One host action.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptStep {
    Mode { mode: Mode },
    Shape { shape: ShapeKind },
    Color { color: String },
    LineWidth { width: f64 },
    EraserSize { size: f64 },
    Down {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    Move {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    Up {
        x: f64,
        y: f64,
        #[serde(default)]
        shift: bool,
    },
    /// Pointer left the canvas.
    Leave,
    Wheel { x: f64, y: f64, notches: f64 },
    /// Submit the open text entry.
    Text { content: String },
    Key {
        key: String,
        #[serde(default)]
        ctrl: bool,
        #[serde(default)]
        shift: bool,
    },
    Undo,
    Redo,
    Clear,
    Solve {
        #[serde(default)]
        question: String,
    },
    Import { path: PathBuf },
    /// Drag in the 3D view between two viewport pixels.
    SceneDrag { from: [f32; 2], to: [f32; 2] },
    /// Display frame boundary.
    Tick,
}

fn pointer(x: f64, y: f64, shift: bool) -> PointerInput {
    let modifiers = if shift { Modifiers::shift() } else { Modifiers::NONE };
    PointerInput::new(x, y).with_modifiers(modifiers)
}

fn positive(what: &'static str, value: f64) -> Result<f64, ScriptError> {
    if is_positive(value) {
        Ok(value)
    } else {
        Err(ScriptError::InvalidWidth { what, value })
    }
}

/// A canvas plus everything the host wires around it.
pub struct Session {
    pub canvas: Canvas,
    settings: Settings,
    viewport: (u32, u32),
    frames: FrameScheduler,
    last_frame: FrameStats,
    solve: SolveSession,
    solver: Arc<dyn Solver>,
    camera: OrbitCamera,
    scene_drag: SceneDrag,
    models: Vec<LoadOutcome>,
    notifications: Vec<String>,
}

impl Session {
    pub fn new(settings: Settings, width: u32, height: u32) -> Result<Self, ScriptError> {
        let solver = Self::default_solver(&settings)?;
        let mapping = SceneMapping::new(settings.scene_scale_factor);
        Ok(Self {
            canvas: Canvas::new(&settings),
            scene_drag: SceneDrag::new(mapping, settings.scene_pick_radius as f32),
            settings,
            viewport: (width, height),
            frames: FrameScheduler::new(),
            last_frame: FrameStats::default(),
            solve: SolveSession::new(),
            solver,
            camera: OrbitCamera::default(),
            models: Vec::new(),
            notifications: Vec::new(),
        })
    }

    #[cfg(feature = "http")]
    fn default_solver(settings: &Settings) -> Result<Arc<dyn Solver>, ScriptError> {
        Ok(Arc::new(drawsolve_core::solve::HttpSolver::new(settings.solve_endpoint.clone())?))
    }

    #[cfg(not(feature = "http"))]
    fn default_solver(_settings: &Settings) -> Result<Arc<dyn Solver>, ScriptError> {
        Ok(Arc::new(SimulatedSolver::default()))
    }

    pub fn with_solver(mut self, solver: Arc<dyn Solver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn solve_state(&self) -> &SolveState {
        self.solve.state()
    }

    pub fn models(&self) -> &[LoadOutcome] {
        &self.models
    }

    /// User-facing messages produced so far (failed imports, failed solves).
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn frames_painted(&self) -> u64 {
        self.frames.frames()
    }

    pub fn last_frame(&self) -> FrameStats {
        self.last_frame
    }

    fn notify(&mut self, message: String) {
        log::warn!("{message}");
        self.notifications.push(message);
    }

    fn viewport_center(&self) -> Point {
        Point::new(f64::from(self.viewport.0) / 2.0, f64::from(self.viewport.1) / 2.0)
    }

    /// Apply every step, settle any solve in flight, then paint a final frame.
    pub fn run(&mut self, script: &Script) -> Result<(), ScriptError> {
        for step in &script.steps {
            self.apply(step)?;
        }
        self.wait_for_solve();
        self.tick();
        Ok(())
    }

    pub fn apply(&mut self, step: &ScriptStep) -> Result<(), ScriptError> {
        log::debug!("Step {step:?}");
        match step {
            ScriptStep::Mode { mode } => self.canvas.set_mode(*mode),
            ScriptStep::Shape { shape } => self.canvas.tools.shape = *shape,
            ScriptStep::Color { color } => self.canvas.tools.color = color.parse::<SerializableColor>()?,
            ScriptStep::LineWidth { width } => self.canvas.tools.line_width = positive("line width", *width)?,
            ScriptStep::EraserSize { size } => self.canvas.tools.eraser_size = positive("eraser size", *size)?,
            ScriptStep::Down { x, y, shift } => self.canvas.pointer_down(pointer(*x, *y, *shift)),
            ScriptStep::Move { x, y, shift } => self.canvas.pointer_move(pointer(*x, *y, *shift)),
            ScriptStep::Up { x, y, shift } => self.canvas.pointer_up(pointer(*x, *y, *shift)),
            ScriptStep::Leave => self.canvas.pointer_leave(),
            ScriptStep::Wheel { x, y, notches } => self.canvas.zoom(Point::new(*x, *y), *notches),
            ScriptStep::Text { content } => {
                self.canvas.submit_text(content);
            }
            ScriptStep::Key { key, ctrl, shift } => match ShortcutRegistry::lookup(key, *ctrl, *shift) {
                Some(action) => self.key_action(action)?,
                None => log::debug!("Unbound key {key}"),
            },
            ScriptStep::Undo => {
                self.canvas.undo();
            }
            ScriptStep::Redo => {
                self.canvas.redo();
            }
            ScriptStep::Clear => self.canvas.clear(),
            ScriptStep::Solve { question } => self.solve(question)?,
            ScriptStep::Import { path } => self.import(path),
            ScriptStep::SceneDrag { from, to } => self.scene_drag(Vec2::from_array(*from), Vec2::from_array(*to)),
            ScriptStep::Tick => {
                self.tick();
                return Ok(());
            }
        }
        self.frames.invalidate();
        Ok(())
    }

    fn key_action(&mut self, action: KeyAction) -> Result<(), ScriptError> {
        match action {
            KeyAction::SetMode(mode) => self.canvas.set_mode(mode),
            KeyAction::Undo => {
                self.canvas.undo();
            }
            KeyAction::Redo => {
                self.canvas.redo();
            }
            KeyAction::Clear => self.canvas.clear(),
            KeyAction::ZoomIn => self.canvas.zoom(self.viewport_center(), 1.0),
            KeyAction::ZoomOut => self.canvas.zoom(self.viewport_center(), -1.0),
            KeyAction::ZoomReset => self.canvas.view.reset(),
            KeyAction::CycleGrid => self.settings.grid_style = self.settings.grid_style.next(),
            KeyAction::Solve => self.solve("")?,
            KeyAction::Cancel => self.canvas.cancel_text(),
        }
        Ok(())
    }

    /// Collect a finished solve, then paint if anything changed since the last tick.
    pub fn tick(&mut self) {
        self.collect_solve(false);
        if !self.frames.take_frame() {
            return;
        }
        let (w, h) = self.viewport;
        let ctx = RenderContext::from_settings(&self.canvas, Size::new(f64::from(w), f64::from(h)), &self.settings);
        let mut renderer = SurfaceRenderer::new(RecordingSurface::new());
        renderer.build_scene(&ctx);
        self.last_frame = renderer.stats();
        log::trace!("Frame {}: {:?}", self.frames.frames(), self.last_frame);
    }

    fn solve(&mut self, question: &str) -> Result<(), ScriptError> {
        let (w, h) = self.viewport;
        let image = export_data_url(&self.canvas, w, h, self.settings.background.into())?;
        self.solve.start(Arc::clone(&self.solver), image, question);
        Ok(())
    }

    /// Block until the solve in flight resolves.
    pub fn wait_for_solve(&mut self) {
        self.collect_solve(true);
    }

    /// Pick up the result of the solve in flight. Returns true if one resolved.
    fn collect_solve(&mut self, block: bool) -> bool {
        if !self.solve.is_pending() {
            return false;
        }
        let state = if block { self.solve.wait() } else { self.solve.poll() };
        match state {
            SolveState::Loading => return false,
            SolveState::Failed(message) => {
                let message = message.clone();
                self.notify(message);
            }
            _ => {
                for line in self.solve.render_answers(&InlineMarkup) {
                    log::info!("Answer: {line}");
                }
            }
        }
        self.frames.invalidate();
        true
    }

    fn import(&mut self, path: &Path) {
        let timeout = Duration::from_secs(self.settings.model_load_timeout_secs);
        let handle = match import_model_file(path, Arc::new(BoundsLoader), self.settings.max_model_bytes, timeout) {
            Ok(handle) => handle,
            Err(err) => {
                self.notify(err.to_string());
                return;
            }
        };
        let Some(outcome) = handle.wait() else { return };
        if let LoadOutcome::Placeholder { reason } = &outcome {
            self.notify(format!("Showing placeholder for {}: {reason}", path.display()));
        }
        self.models.push(outcome);
    }

    fn scene_drag(&mut self, from: Vec2, to: Vec2) {
        let (w, h) = self.viewport;
        let viewport = Vec2::new(w as f32, h as f32);
        let document = &mut self.canvas.document;
        if self.scene_drag.pointer_down(document, &self.camera, from, viewport).is_none() {
            log::debug!("Scene drag at {from} hit nothing");
            return;
        }
        self.scene_drag.pointer_move(document, &self.camera, to, viewport);
        self.scene_drag.pointer_up(document);
    }

    /// The 3D mirror of the current objects.
    pub fn scene(&self) -> Vec<SceneNode> {
        mirror_objects(self.canvas.objects(), &self.scene_drag.mapping)
    }

    pub fn export_png(&self) -> Result<Vec<u8>, ScriptError> {
        let (w, h) = self.viewport;
        Ok(export_png(&self.canvas, w, h, self.settings.background.into())?)
    }

    pub fn export_data_url(&self) -> Result<String, ScriptError> {
        let (w, h) = self.viewport;
        Ok(export_data_url(&self.canvas, w, h, self.settings.background.into())?)
    }
}
