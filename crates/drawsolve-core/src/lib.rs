//! Draw & Solve Core Library
//!
//! Host-agnostic data structures and interaction logic for the Draw & Solve canvas.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod history;
pub mod hit;
pub mod import;
pub mod input;
pub mod scene3d;
pub mod shapes;
pub mod snap;
pub mod solve;
pub mod tools;
pub mod typeset;

pub use camera::ViewTransform;
pub use canvas::{Canvas, CanvasDocument};
pub use config::{ConfigError, GridStyle, Settings};
pub use history::History;
pub use hit::find_topmost_at;
pub use import::{ImportError, LoadOutcome, ModelFormat, model_format, validate_model_file};
pub use input::{Modifiers, PointerEvent, PointerInput};
pub use scene3d::{OrbitCamera, SceneDrag, SceneMapping, SceneNode, mirror_objects};
pub use shapes::{SerializableColor, Shape, ShapeStyle};
pub use snap::{ANGLE_SNAP_INCREMENT, snap_line_endpoint};
pub use solve::{SolveError, SolveSession, SolveState, Solver};
pub use tools::{Mode, ShapeKind, ToolSettings};
pub use typeset::{InlineMarkup, MathTypesetter};
