use std::ops::RangeInclusive;
use std::time::Duration;

/// Lazy, time-ordered frame indices for one animation run.
///
/// Yields every timestep from the (truncated) start time to the horizon inclusive.
/// The final index equals the horizon, which lies outside the drawable range and
/// makes the viewer close the display. A run is consumed as it iterates; start a
/// new one to replay.
#[derive(Debug, Clone)]
pub struct Animation {
    frames: RangeInclusive<i64>,
    interval: Duration,
}

impl Animation {
    /// `start_t` is truncated toward zero; `real_t` is the pause between frames in
    /// seconds, kept to whole milliseconds.
    pub fn new(start_t: f64, horizon: u32, real_t: f64) -> Self {
        let start = start_t.trunc() as i64;
        Animation {
            frames: start..=horizon as i64,
            interval: frame_interval(real_t),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Pause between frames for `real_t` seconds, truncated to whole milliseconds.
pub fn frame_interval(real_t: f64) -> Duration {
    Duration::from_millis((1000.0 * real_t).max(0.0) as u64)
}

impl Iterator for Animation {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        self.frames.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.frames.size_hint()
    }
}

impl ExactSizeIterator for Animation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_run_to_horizon_inclusive() {
        let frames: Vec<i64> = Animation::new(0.0, 3, 0.1).collect();
        assert_eq!(frames, vec![0, 1, 2, 3]);
    }

    #[test]
    fn start_time_is_truncated() {
        let anim = Animation::new(2.9, 4, 0.1);
        assert_eq!(anim.collect::<Vec<_>>(), vec![2, 3, 4]);
        let anim = Animation::new(-1.5, 1, 0.1);
        assert_eq!(anim.collect::<Vec<_>>(), vec![-1, 0, 1]);
    }

    #[test]
    fn start_after_horizon_is_empty() {
        let anim = Animation::new(10.0, 4, 0.1);
        assert_eq!(anim.len(), 0);
    }

    #[test]
    fn interval_in_whole_milliseconds() {
        assert_eq!(Animation::new(0.0, 1, 0.1).interval(), Duration::from_millis(100));
        assert_eq!(Animation::new(0.0, 1, 0.0255).interval(), Duration::from_millis(25));
        assert_eq!(Animation::new(0.0, 1, -2.0).interval(), Duration::ZERO);
    }

    #[test]
    fn consumed_run_stays_exhausted() {
        let mut anim = Animation::new(0.0, 1, 0.1);
        assert_eq!(anim.by_ref().count(), 2);
        assert_eq!(anim.next(), None);
    }
}
