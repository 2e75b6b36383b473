//! Single-slot input buffer
//!
//! Holds at most one action. A newer action overwrites the older one, and a
//! held action is only handed back if it is still within the window.

use driftblocks_core::types::Action;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferedInput {
    pub action: Action,
    pub at_ms: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputBuffer {
    pending: Option<BufferedInput>,
    window_ms: f64,
}

impl InputBuffer {
    pub fn new(window_ms: f64) -> Self {
        Self {
            pending: None,
            window_ms,
        }
    }

    pub fn push(&mut self, action: Action, now_ms: f64) {
        self.pending = Some(BufferedInput {
            action,
            at_ms: now_ms,
        });
    }

    /// Take the pending action; stale actions are dropped silently
    pub fn take_fresh(&mut self, now_ms: f64) -> Option<Action> {
        let buffered = self.pending.take()?;
        (now_ms - buffered.at_ms <= self.window_ms).then_some(buffered.action)
    }

    pub fn pending(&self) -> Option<&BufferedInput> {
        self.pending.as_ref()
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn window_ms(&self) -> f64 {
        self.window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_action_overwrites() {
        let mut buffer = InputBuffer::new(100.0);
        buffer.push(Action::MOVE_LEFT, 0.0);
        buffer.push(Action::HardDrop, 10.0);
        assert_eq!(buffer.take_fresh(20.0), Some(Action::HardDrop));
        assert_eq!(buffer.take_fresh(20.0), None);
    }

    #[test]
    fn test_window_edges() {
        let mut buffer = InputBuffer::new(100.0);
        buffer.push(Action::ROTATE_CW, 1000.0);
        assert_eq!(buffer.take_fresh(1100.0), Some(Action::ROTATE_CW));

        buffer.push(Action::ROTATE_CW, 1000.0);
        assert_eq!(buffer.take_fresh(1150.0), None);
        assert!(buffer.pending().is_none());
    }
}
