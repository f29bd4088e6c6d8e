//! Keyboard shortcut registry and documentation.

use drawsolve_core::tools::Mode;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    SetMode(Mode),
    Undo,
    Redo,
    Clear,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    /// Lines, dots, none.
    CycleGrid,
    Solve,
    /// Abandon the current text entry.
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub description: &'static str,
    pub action: KeyAction,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        description: &'static str,
        action: KeyAction,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            description,
            action,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("D", false, false, "Draw", KeyAction::SetMode(Mode::Draw)),
            Shortcut::new("E", false, false, "Erase", KeyAction::SetMode(Mode::Erase)),
            Shortcut::new("S", false, false, "Shapes", KeyAction::SetMode(Mode::Shape)),
            Shortcut::new("M", false, false, "Move objects", KeyAction::SetMode(Mode::Move)),
            Shortcut::new("T", false, false, "Text", KeyAction::SetMode(Mode::Text)),
            Shortcut::new("H", false, false, "Pan the canvas", KeyAction::SetMode(Mode::Hand)),
            Shortcut::new("Z", true, false, "Undo", KeyAction::Undo),
            Shortcut::new("Z", true, true, "Redo", KeyAction::Redo),
            Shortcut::new("Y", true, false, "Redo", KeyAction::Redo),
            Shortcut::new("Delete", true, false, "Clear the canvas", KeyAction::Clear),
            Shortcut::new("=", true, false, "Zoom in", KeyAction::ZoomIn),
            Shortcut::new("-", true, false, "Zoom out", KeyAction::ZoomOut),
            Shortcut::new("0", true, false, "Reset zoom", KeyAction::ZoomReset),
            Shortcut::new("G", false, false, "Cycle grid style", KeyAction::CycleGrid),
            Shortcut::new("Enter", true, false, "Solve the drawing", KeyAction::Solve),
            Shortcut::new("Escape", false, false, "Cancel text entry", KeyAction::Cancel),
        ]
    }

    /// Find the shortcut for a key press. Letter keys match case-insensitively.
    pub fn lookup(key: &str, ctrl: bool, shift: bool) -> Option<KeyAction> {
        Self::all()
            .into_iter()
            .find(|s| s.key.eq_ignore_ascii_case(key) && s.ctrl == ctrl && s.shift == shift)
            .map(|s| s.action)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
