use std::time::{Duration, Instant};

/// Source of per-frame elapsed time.
pub trait DeltaSource {
    fn delta(&mut self) -> Duration;
}

/// Monotonic wall-clock deltas. The first call reports zero so a freshly
/// started loop does not see the time spent before it was created.
#[derive(Debug, Default)]
pub struct InstantClock {
    last: Option<Instant>,
}

impl InstantClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delta_at(&mut self, now: Instant) -> Duration {
        let dt = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::ZERO,
        };
        self.last = Some(now);
        dt
    }
}

impl DeltaSource for InstantClock {
    fn delta(&mut self) -> Duration {
        self.delta_at(Instant::now())
    }
}

/// Deterministic clock that advances by the same step every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedStep {
    step: Duration,
}

impl FixedStep {
    pub fn new(step: Duration) -> Self {
        Self { step }
    }

    pub fn from_fps(fps: u32) -> Self {
        Self::new(Duration::from_secs(1) / fps.max(1))
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl DeltaSource for FixedStep {
    fn delta(&mut self) -> Duration {
        self.step
    }
}
