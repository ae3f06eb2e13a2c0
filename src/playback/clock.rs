use std::time::Duration;
use tracing::debug;

use crate::core::{Path, PathNode};

/// Result of advancing the clock by one host tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTick {
    /// Segment being traversed when the tick started
    pub previous_segment_index: usize,
    /// Segment being traversed after overshoot correction
    pub segment_index: usize,
    /// Segments fully traversed during this tick, including the final one
    /// when the route completes
    pub segments_consumed: usize,
    /// Progress through `segment_index`, 0..=1
    pub fraction: f64,
    /// Distance over duration of `segment_index`, metres per second
    pub current_speed_estimate: f64,
    pub completed: bool,
}

/// Speed-scaled route clock
///
/// Tracks how far into the current segment playback has progressed. Time
/// left over after finishing a segment is carried into the next one, so no
/// drift accumulates regardless of tick jitter or speed.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    segment_index: usize,
    elapsed_in_segment: f64,
    current_speed_estimate: f64,
    total_simulated: f64,
    completed: bool,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segment_index(&self) -> usize {
        self.segment_index
    }

    pub fn elapsed_in_segment(&self) -> f64 {
        self.elapsed_in_segment
    }

    pub fn current_speed_estimate(&self) -> f64 {
        self.current_speed_estimate
    }

    /// Route seconds consumed since the session started
    pub fn total_simulated(&self) -> f64 {
        self.total_simulated
    }

    /// Advance by one tick of `tick_duration` real time at `speed`
    pub fn tick(&mut self, path: &Path, tick_duration: Duration, speed: f64) -> ClockTick {
        let previous_segment_index = self.segment_index;

        let last = match path.last_traversable_index() {
            Some(last) if !self.completed => last,
            _ => {
                self.completed = true;
                return self.report(previous_segment_index, 0, 1.0);
            }
        };

        let raw_step = tick_duration.as_secs_f64() * speed;
        if raw_step == f64::INFINITY {
            return self.jump_to_end(path, previous_segment_index, last);
        }
        // NaN (a zero tick at infinite speed) and negative steps advance nothing
        let step = if raw_step > 0.0 { raw_step } else { 0.0 };
        self.elapsed_in_segment += step;
        self.total_simulated += step;

        let nodes = path.nodes();
        let mut consumed = 0;

        while self.segment_index < last && self.elapsed_in_segment >= nodes[self.segment_index].segment_duration {
            self.elapsed_in_segment -= nodes[self.segment_index].segment_duration;
            self.segment_index += 1;
            consumed += 1;
        }

        if consumed > 1 {
            debug!(
                "Overshoot: crossed {} segments in one tick ({} -> {})",
                consumed, previous_segment_index, self.segment_index
            );
        }

        let current = &nodes[self.segment_index];
        self.current_speed_estimate = speed_estimate(current);

        if self.segment_index == last && self.elapsed_in_segment >= current.segment_duration {
            self.completed = true;
            return self.report(previous_segment_index, consumed + 1, 1.0);
        }

        let fraction = if current.segment_duration > 0.0 {
            (self.elapsed_in_segment / current.segment_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };

        self.report(previous_segment_index, consumed, fraction)
    }

    /// Consume the rest of the route in one step
    fn jump_to_end(&mut self, path: &Path, previous_segment_index: usize, last: usize) -> ClockTick {
        let nodes = path.nodes();
        let remaining: f64 = nodes[self.segment_index..=last].iter().map(|n| n.segment_duration).sum();
        self.total_simulated += (remaining - self.elapsed_in_segment).max(0.0);

        let consumed = last - self.segment_index + 1;
        self.segment_index = last;
        self.elapsed_in_segment = nodes[last].segment_duration;
        self.current_speed_estimate = speed_estimate(&nodes[last]);
        self.completed = true;

        debug!("Infinite step: jumped from segment {} to the end", previous_segment_index);
        self.report(previous_segment_index, consumed, 1.0)
    }

    fn report(&self, previous_segment_index: usize, segments_consumed: usize, fraction: f64) -> ClockTick {
        ClockTick {
            previous_segment_index,
            segment_index: self.segment_index,
            segments_consumed,
            fraction,
            current_speed_estimate: self.current_speed_estimate,
            completed: self.completed,
        }
    }
}

fn speed_estimate(node: &PathNode) -> f64 {
    if node.segment_duration > 0.0 {
        node.segment_distance / node.segment_duration
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Coordinate;

    fn path_with_durations(durations: &[f64]) -> Path {
        let mut nodes: Vec<PathNode> = durations
            .iter()
            .enumerate()
            .map(|(i, &d)| PathNode::new(Coordinate::new(i as f64 * 0.001, 0.0), d * 10.0, d))
            .collect();
        nodes.push(PathNode::new(Coordinate::new(durations.len() as f64 * 0.001, 0.0), 0.0, 0.0));
        Path::new(nodes).unwrap()
    }

    #[test]
    fn test_fraction_within_segment() {
        let path = path_with_durations(&[4.0, 4.0]);
        let mut clock = PlaybackClock::new();

        let t = clock.tick(&path, Duration::from_secs(1), 1.0);
        assert_eq!(t.segment_index, 0);
        assert_eq!(t.fraction, 0.25);
        assert_eq!(t.current_speed_estimate, 10.0);
        assert!(!t.completed);
    }

    #[test]
    fn test_residual_carries_into_next_segment() {
        let path = path_with_durations(&[1.0, 4.0, 4.0]);
        let mut clock = PlaybackClock::new();

        let t = clock.tick(&path, Duration::from_millis(1500), 1.0);
        assert_eq!(t.previous_segment_index, 0);
        assert_eq!(t.segment_index, 1);
        assert_eq!(t.segments_consumed, 1);
        assert_eq!(clock.elapsed_in_segment(), 0.5);
        assert_eq!(t.fraction, 0.125);
    }

    #[test]
    fn test_overshoot_across_whole_route_in_one_tick() {
        let path = path_with_durations(&[1.0, 1.0, 1.0]);
        let mut clock = PlaybackClock::new();

        let t = clock.tick(&path, Duration::from_millis(1000), 5.0);
        assert!(t.completed);
        assert_eq!(t.previous_segment_index, 0);
        assert_eq!(t.segment_index, 2);
        assert_eq!(t.segments_consumed, 3);
        assert_eq!(t.fraction, 1.0);
    }

    #[test]
    fn test_completed_is_terminal() {
        let path = path_with_durations(&[1.0]);
        let mut clock = PlaybackClock::new();

        assert!(clock.tick(&path, Duration::from_secs(2), 1.0).completed);
        let simulated = clock.total_simulated();

        let again = clock.tick(&path, Duration::from_secs(2), 1.0);
        assert!(again.completed);
        assert_eq!(again.segments_consumed, 0);
        assert_eq!(clock.total_simulated(), simulated);
    }

    #[test]
    fn test_zero_duration_segments_are_skipped() {
        let path = path_with_durations(&[2.0, 0.0, 0.0, 2.0]);
        let mut clock = PlaybackClock::new();

        let t = clock.tick(&path, Duration::from_millis(2500), 1.0);
        assert_eq!(t.segment_index, 3);
        assert_eq!(t.segments_consumed, 3);
        assert!((t.fraction - 0.25).abs() < 1e-12);
        assert!(t.fraction.is_finite());
        assert!(!t.completed);

        let t = clock.tick(&path, Duration::from_millis(1500), 1.0);
        assert!(t.completed);
    }

    #[test]
    fn test_trailing_zero_duration_segment_completes_without_division() {
        let path = path_with_durations(&[1.0, 0.0]);
        let mut clock = PlaybackClock::new();

        let t = clock.tick(&path, Duration::from_millis(500), 1.0);
        assert_eq!(t.segment_index, 0);
        assert!(!t.completed);

        let t = clock.tick(&path, Duration::from_millis(500), 1.0);
        assert!(t.completed);
        assert_eq!(t.current_speed_estimate, 0.0);
    }

    #[test]
    fn test_degenerate_paths_complete_immediately() {
        let mut clock = PlaybackClock::new();
        assert!(clock.tick(&Path::default(), Duration::from_millis(33), 1.0).completed);

        let single = Path::new(vec![PathNode::new(Coordinate::new(1.0, 1.0), 0.0, 0.0)]).unwrap();
        let mut clock = PlaybackClock::new();
        let t = clock.tick(&single, Duration::from_millis(33), 1.0);
        assert!(t.completed);
        assert_eq!(t.segment_index, 0);
    }

    #[test]
    fn test_zero_speed_on_zero_length_route_completes() {
        let path = path_with_durations(&[0.0, 0.0]);
        let mut clock = PlaybackClock::new();
        assert!(clock.tick(&path, Duration::from_millis(33), 0.0).completed);
    }

    #[test]
    fn test_total_time_bounded_by_one_tick() {
        let durations = [2.5, 0.0, 4.0, 1.2, 0.3, 7.75];
        let path = path_with_durations(&durations);
        let total: f64 = durations.iter().sum();

        for &speed in &[0.37, 1.0, 3.0, 25.0] {
            for &tick_ms in &[16u64, 33, 250] {
                let mut clock = PlaybackClock::new();
                let step = tick_ms as f64 / 1000.0 * speed;
                let mut ticks = 0u64;
                while !clock.tick(&path, Duration::from_millis(tick_ms), speed).completed {
                    ticks += 1;
                    assert!(ticks < 1_000_000, "clock never completed");
                }
                ticks += 1;

                let consumed = ticks as f64 * step;
                assert!(consumed >= total - 1e-9, "speed {} tick {}: {} < {}", speed, tick_ms, consumed, total);
                assert!(consumed - step <= total + 1e-9, "speed {} tick {}: overran by more than a tick", speed, tick_ms);
            }
        }
    }

    #[test]
    fn test_segment_index_never_decreases_and_stays_in_range() {
        let path = path_with_durations(&[0.5, 3.0, 0.0, 1.0]);
        let mut clock = PlaybackClock::new();
        let mut last_index = 0;
        let ticks = [10u64, 900, 5, 1200, 40, 3000];
        for ms in ticks {
            let t = clock.tick(&path, Duration::from_millis(ms), 1.3);
            assert!(t.segment_index >= last_index);
            assert!(t.segment_index <= path.last_traversable_index().unwrap());
            assert!((0.0..=1.0).contains(&t.fraction));
            last_index = t.segment_index;
        }
    }

    #[test]
    fn test_non_finite_steps_never_poison_the_clock() {
        let path = path_with_durations(&[4.0, 6.0]);
        let mut clock = PlaybackClock::new();

        // 0 s at infinite speed is NaN and must be a no-op
        let t = clock.tick(&path, Duration::ZERO, f64::INFINITY);
        assert!(!t.completed);
        assert!(t.fraction.is_finite());
        assert_eq!(clock.total_simulated(), 0.0);
        assert_eq!(clock.elapsed_in_segment(), 0.0);

        let t = clock.tick(&path, Duration::from_millis(500), f64::NAN);
        assert!(!t.completed);
        assert_eq!(clock.total_simulated(), 0.0);

        let t = clock.tick(&path, Duration::from_secs(1), 1.0);
        assert_eq!(t.fraction, 0.25);
    }

    #[test]
    fn test_infinite_step_completes_the_route() {
        let path = path_with_durations(&[4.0, 0.0, 6.0]);
        let mut clock = PlaybackClock::new();
        clock.tick(&path, Duration::from_secs(1), 1.0);

        let t = clock.tick(&path, Duration::from_millis(33), f64::INFINITY);
        assert!(t.completed);
        assert_eq!(t.segment_index, 2);
        assert_eq!(t.segments_consumed, 3);
        assert_eq!(t.fraction, 1.0);
        assert_eq!(clock.total_simulated(), 10.0);
    }
}
