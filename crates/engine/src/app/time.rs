use std::time::{Duration, Instant};

/// Frame clock. The reported delta is clamped; the timeline is not, so one
/// stall produces a single capped step instead of a backlog.
#[derive(Debug, Clone)]
pub struct TimeSource {
    origin: Instant,
    previous: Instant,
    delta: Duration,
    max_delta: Duration,
}

impl TimeSource {
    pub fn new(max_delta: Duration) -> Self {
        Self::starting_at(Instant::now(), max_delta)
    }

    pub(crate) fn starting_at(origin: Instant, max_delta: Duration) -> Self {
        Self {
            origin,
            previous: origin,
            delta: Duration::ZERO,
            max_delta,
        }
    }

    pub(crate) fn update(&mut self) {
        self.update_at(Instant::now());
    }

    pub(crate) fn update_at(&mut self, now: Instant) {
        let raw = now.saturating_duration_since(self.previous);
        self.previous = now;
        self.delta = clamp_frame_delta(raw, self.max_delta);
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_time(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_time(&self) -> f32 {
        self.previous
            .saturating_duration_since(self.origin)
            .as_secs_f32()
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}
