/// Fixed-timestep accumulator driven by millisecond frame timestamps.
///
/// Each frame adds the time since the previous timestamp to a lag budget;
/// the caller then runs steps while [`FixedStep::take_step`] agrees. A lag of
/// three intervals or more (a stall, a hidden window) collapses to a single
/// interval so the simulation never tries to catch up.
#[derive(Debug, Clone)]
pub struct FixedStep {
    interval_ms: f64,
    prev_ms: f64,
    lag_ms: f64,
}

impl FixedStep {
    /// Steps lag may fall short of a full interval by this fraction and still run.
    const TOLERANCE: f64 = 0.9;
    /// Lag at or beyond this many intervals is reset to one interval.
    const MAX_BACKLOG: f64 = 3.0;

    /// Accumulator for `fps` steps per second (at least one).
    pub fn new(fps: u32) -> Self {
        Self { interval_ms: 1000.0 / f64::from(fps.max(1)), prev_ms: 0.0, lag_ms: 0.0 }
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn lag_ms(&self) -> f64 {
        self.lag_ms
    }

    /// Adds the time elapsed since the previous timestamp to the lag.
    pub fn accumulate(&mut self, timestamp_ms: f64) {
        let elapsed = timestamp_ms - self.prev_ms;
        self.prev_ms = timestamp_ms;
        self.lag_ms += elapsed;

        if self.lag_ms >= self.interval_ms * Self::MAX_BACKLOG {
            log::debug!("fixed step: {:.1} ms backlog dropped", self.lag_ms - self.interval_ms);
            self.lag_ms = self.interval_ms;
        }
    }

    /// Consumes one interval of lag if enough has built up.
    pub fn take_step(&mut self) -> bool {
        if self.lag_ms >= self.interval_ms * Self::TOLERANCE {
            self.lag_ms -= self.interval_ms;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(fs: &mut FixedStep, timestamp: f64) -> u32 {
        fs.accumulate(timestamp);
        let mut n = 0;
        while fs.take_step() {
            n += 1;
        }
        n
    }

    #[test]
    fn long_stall_runs_one_step() {
        let mut fs = FixedStep::new(60);
        assert_eq!(steps(&mut fs, 10_000.0), 1);
        assert!(fs.lag_ms().abs() < 1e-9);
    }

    #[test]
    fn one_interval_per_frame_at_matching_rate() {
        let mut fs = FixedStep::new(50);
        assert_eq!(steps(&mut fs, 20.0), 1);
        assert_eq!(steps(&mut fs, 40.0), 1);
        assert_eq!(steps(&mut fs, 60.0), 1);
    }

    #[test]
    fn slightly_short_frame_still_steps() {
        let mut fs = FixedStep::new(50);
        assert_eq!(steps(&mut fs, 18.5), 1);
        assert!((fs.lag_ms() + 1.5).abs() < 1e-9);
    }

    #[test]
    fn fast_frames_accumulate() {
        let mut fs = FixedStep::new(50);
        assert_eq!(steps(&mut fs, 10.0), 0);
        assert_eq!(steps(&mut fs, 20.0), 1);
    }

    #[test]
    fn backlog_below_three_intervals_catches_up() {
        let mut fs = FixedStep::new(50);
        assert_eq!(steps(&mut fs, 59.0), 3);
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        assert_eq!(FixedStep::new(0).interval_ms(), 1000.0);
    }
}
