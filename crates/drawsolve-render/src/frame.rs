//! Redraw coalescing.

/// Collapses any number of invalidations between two frame ticks into one
/// paint. The host calls [`FrameScheduler::invalidate`] on every state change
/// and [`FrameScheduler::take_frame`] once per display frame.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    dirty: bool,
    pending_changes: u32,
    frames: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.dirty = true;
        self.pending_changes = self.pending_changes.saturating_add(1);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether this tick should paint. Clears the dirty flag.
    pub fn take_frame(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        log::trace!("Painting frame for {} changes", self.pending_changes);
        self.dirty = false;
        self.pending_changes = 0;
        self.frames += 1;
        true
    }

    /// Frames painted so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coalesces_changes() {
        let mut frames = FrameScheduler::new();
        assert!(!frames.take_frame());
        for _ in 0..5 {
            frames.invalidate();
        }
        assert!(frames.is_dirty());
        assert!(frames.take_frame());
        assert!(!frames.take_frame());
        assert_eq!(frames.frames(), 1);
    }
}
