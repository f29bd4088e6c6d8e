//! Draw & Solve Application
//!
//! Headless host for the canvas: replays recorded host actions, wires the
//! solve and import flows, and exports the result.

mod session;
mod shortcuts;

pub use session::{Script, ScriptError, ScriptStep, Session};
pub use shortcuts::{KeyAction, Shortcut, ShortcutRegistry};
