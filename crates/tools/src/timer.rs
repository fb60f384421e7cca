use std::time::Duration;

/// Ring buffer of recent frame deltas.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

impl FrameTimer {
    /// Largest history a timer keeps.
    pub const MAX_CAPACITY: usize = 10_000;

    /// A timer remembering the last `capacity` frames, clamped to
    /// `1..=MAX_CAPACITY`.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, Self::MAX_CAPACITY);
        Self {
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
    }

    /// Record a delta given in seconds. Negative or non-finite values count
    /// as zero.
    pub fn record_secs(&mut self, dt: f32) {
        self.record(Duration::try_from_secs_f32(dt).unwrap_or(Duration::ZERO));
    }

    fn window(&self) -> &[Duration] {
        &self.history[..self.count()]
    }

    pub fn average(&self) -> Duration {
        let window = self.window();
        if window.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = window.iter().sum();
        total / window.len() as u32
    }

    pub fn max(&self) -> Duration {
        self.window().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.window().iter().copied().min().unwrap_or(Duration::ZERO)
    }

    /// Most recent delta.
    pub fn last(&self) -> Option<Duration> {
        if self.count() == 0 {
            return None;
        }
        let idx = (self.index + self.capacity - 1) % self.capacity;
        Some(self.history[idx])
    }

    /// Frames per second over the window; 0 when nothing has been timed.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }

    pub fn count(&self) -> usize {
        if self.filled { self.capacity } else { self.index }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.index = 0;
        self.filled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_history() {
        let mut timer = FrameTimer::new(3);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));

        assert_eq!(timer.count(), 3);
        assert_eq!(timer.average(), Duration::from_millis(20));
        assert_eq!(timer.max(), Duration::from_millis(30));
        assert_eq!(timer.min(), Duration::from_millis(10));
        assert_eq!(timer.last(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn wraps_around() {
        let mut timer = FrameTimer::new(2);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30)); // overwrites first

        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Duration::from_millis(25));
        assert_eq!(timer.last(), Some(Duration::from_millis(30)));
    }

    #[test]
    fn fps_from_average() {
        let mut timer = FrameTimer::new(4);
        assert_eq!(timer.fps(), 0.0);
        for _ in 0..4 {
            timer.record(Duration::from_millis(20));
        }
        assert!((timer.fps() - 50.0).abs() < 0.01);
    }

    #[test]
    fn bad_seconds_count_as_zero() {
        let mut timer = FrameTimer::new(2);
        timer.record_secs(-1.0);
        timer.record_secs(f32::NAN);
        assert_eq!(timer.max(), Duration::ZERO);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut timer = FrameTimer::new(0);
        timer.record(Duration::from_millis(5));
        assert_eq!(timer.capacity(), 1);
        assert_eq!(timer.count(), 1);
        timer.clear();
        assert_eq!(timer.last(), None);
    }
}
