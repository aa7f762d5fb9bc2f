use std::time::Duration;

/// Ring buffer of recent frame times.
#[derive(Debug)]
pub struct FrameTimer {
    history: Vec<Duration>,
    index: usize,
    filled: bool,
}

impl FrameTimer {
    /// `capacity` of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![Duration::ZERO; capacity.max(1)],
            index: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.history.len();
        if self.index == 0 {
            self.filled = true;
        }
    }

    fn recorded(&self) -> &[Duration] {
        &self.history[..self.count()]
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.history.len()
        } else {
            self.index
        }
    }

    pub fn average(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        self.recorded().iter().sum::<Duration>() / count as u32
    }

    pub fn max(&self) -> Duration {
        self.recorded().iter().copied().max().unwrap_or(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.recorded().iter().copied().min().unwrap_or(Duration::ZERO)
    }

    /// Frames per second from the average frame time, 0 when empty.
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timer_reports_zero() {
        let timer = FrameTimer::new(8);
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.average(), Duration::ZERO);
        assert_eq!(timer.max(), Duration::ZERO);
        assert_eq!(timer.fps(), 0.0);
    }

    #[test]
    fn averages_partial_history() {
        let mut timer = FrameTimer::new(8);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.average(), Duration::from_millis(20));
        assert_eq!(timer.min(), Duration::from_millis(10));
        assert_eq!(timer.max(), Duration::from_millis(30));
        assert!((timer.fps() - 50.0).abs() < 0.01);
    }

    #[test]
    fn wraps_and_forgets_oldest() {
        let mut timer = FrameTimer::new(2);
        timer.record(Duration::from_millis(100));
        timer.record(Duration::from_millis(4));
        timer.record(Duration::from_millis(6));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.max(), Duration::from_millis(6));
        assert_eq!(timer.average(), Duration::from_millis(5));
    }

    #[test]
    fn zero_capacity_still_records() {
        let mut timer = FrameTimer::new(0);
        timer.record(Duration::from_millis(16));
        assert_eq!(timer.count(), 1);
    }
}
