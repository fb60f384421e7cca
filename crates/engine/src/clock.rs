/// Turns host timestamps into clamped frame deltas.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_delta: f32,
}

impl FrameClock {
    /// `max_delta` is in seconds.
    pub fn new(max_delta: f32) -> Self {
        Self {
            last_ms: None,
            max_delta,
        }
    }

    /// Seconds since the previous timestamp. The first tick, a timestamp
    /// going backwards, or a non-finite value all yield 0. Long gaps are
    /// clamped to `max_delta`.
    pub fn tick(&mut self, timestamp_ms: f64) -> f32 {
        if !timestamp_ms.is_finite() {
            return 0.0;
        }
        let dt = match self.last_ms {
            Some(prev) => ((timestamp_ms - prev) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(timestamp_ms);
        dt.clamp(0.0, self.max_delta)
    }

    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }

    /// Forget the previous timestamp, e.g. after the loop was stopped.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
