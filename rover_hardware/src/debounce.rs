//! Interval-based edge debouncer for the operator buttons.
//!
//! The GPIO layer can report several falling edges for one physical press;
//! the core's contract is one callback invocation per press, so the edge
//! watcher filters through this before dispatching.

use std::time::{Duration, Instant};

/// Accepts the first edge and suppresses further edges inside the window.
#[derive(Debug)]
pub struct Debounce {
    window: Duration,
    last: Option<Instant>,
}

impl Debounce {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns true when the edge at `now` should be dispatched.
    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last {
            Some(prev) if now.saturating_duration_since(prev) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_edge_always_accepted() {
        let mut d = Debounce::new(Duration::from_millis(30));
        assert!(d.accept(Instant::now()));
    }

    #[test]
    fn chatter_inside_window_is_suppressed() {
        let mut d = Debounce::new(Duration::from_millis(30));
        let t0 = Instant::now();
        assert!(d.accept(t0));
        assert!(!d.accept(t0 + Duration::from_millis(5)));
        assert!(!d.accept(t0 + Duration::from_millis(29)));
        assert!(d.accept(t0 + Duration::from_millis(30)));
    }

    #[test]
    fn zero_window_accepts_everything() {
        let mut d = Debounce::new(Duration::ZERO);
        let t0 = Instant::now();
        assert!(d.accept(t0));
        assert!(d.accept(t0));
    }
}
