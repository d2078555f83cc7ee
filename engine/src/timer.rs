use std::time::Duration;

/// One-shot deferred trigger driven by accumulated frame time.
///
/// `tick` reports `true` on exactly one call: the first one that brings the
/// elapsed time to or past the configured duration. `rearm` starts it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delay {
    elapsed: Duration,
    duration: Duration,
    fired: bool,
}

impl Delay {
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
            fired: false,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        if self.fired {
            return false;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.duration {
            self.fired = true;
            return true;
        }
        false
    }

    /// Restart, carrying over whatever overshot the previous deadline.
    pub fn rearm(&mut self) {
        self.elapsed = self.elapsed.saturating_sub(self.duration);
        self.fired = false;
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.fired = false;
    }
}
