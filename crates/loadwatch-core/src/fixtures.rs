//! Generated sample sequences for tests.
//!
//! Samples are laid out at the production refetch cadence starting from a
//! fixed epoch. Values come from a seeded RNG so failures reproduce.
//!
//! - *sub-window* sequences span less than one status window and must
//!   never produce an event
//! - *full-window* sequences span at least one status window
//! - *transition* sequences are consecutive, non-overlapping phases

use loadwatch_types::Sample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Poll cadence used when laying out samples.
pub const REFETCH_INTERVAL_MS: u64 = 10_000;

/// Status window used by the fixtures (two minutes).
pub const STATUS_WINDOW_MS: u64 = 120_000;

/// Arbitrary fixed start time for generated sequences.
pub const START_MS: i64 = 1_700_000_000_000;

const INTERVAL: i64 = 10_000;
const WINDOW: i64 = 120_000;

/// Which side of the threshold generated values fall on.
#[derive(Debug, Clone, Copy)]
pub enum Load {
    /// Values in `[0, 1)`.
    Normal,
    /// Values in `[1.01, 11)`.
    High,
}

/// Seeded generator for sample sequences.
pub struct Generator {
    rng: StdRng,
}

impl Generator {
    /// Create a generator from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn value(&mut self, load: Load) -> f64 {
        match load {
            Load::Normal => self.rng.random::<f64>(),
            Load::High => self.rng.random_range(1.01..11.0),
        }
    }

    /// Samples at every refetch tick in `[start, start + duration)`.
    pub fn points(&mut self, start: i64, duration: i64, load: Load) -> Vec<Sample> {
        let mut out = Vec::new();
        let mut elapsed = 0;
        while elapsed < duration {
            let value = self.value(load);
            out.push(Sample::new(start + elapsed, value));
            elapsed += INTERVAL;
        }
        out
    }
}

/// Sub-window and full-window sequences for one load shape.
pub struct Windows {
    /// Spans less than one status window.
    pub sub_window: Vec<Sample>,
    /// Spans at least one status window.
    pub full_window: Vec<Sample>,
}

/// Multi-phase sequences; each inner vector is one phase.
pub struct Transitions {
    /// Full high window, then a full normal window.
    pub high_to_normal: Vec<Vec<Sample>>,
    /// Full normal window, then a full high window.
    pub normal_to_high: Vec<Vec<Sample>>,
    /// Normal, high, normal; each a full window.
    pub normal_to_high_to_normal: Vec<Vec<Sample>>,
}

/// Every fixture family.
pub struct TestDataPoints {
    /// All values `<= 1`.
    pub normal: Windows,
    /// All values `> 1`.
    pub high: Windows,
    /// Normal first half, high second half.
    pub mixed: Windows,
    /// Phase sequences.
    pub transitions: Transitions,
}

impl TestDataPoints {
    /// Generate every fixture family from one seed.
    pub fn generate(seed: u64) -> Self {
        let mut g = Generator::new(seed);

        // A full window holds WINDOW / INTERVAL + 1 samples, so its span is
        // exactly one status window.
        let full = WINDOW + INTERVAL;
        let half = WINDOW / 2;

        let normal = Windows {
            sub_window: g.points(START_MS, WINDOW, Load::Normal),
            full_window: g.points(START_MS, full, Load::Normal),
        };
        let high = Windows {
            sub_window: g.points(START_MS, WINDOW, Load::High),
            full_window: g.points(START_MS, full, Load::High),
        };

        let mut mixed_sub = g.points(START_MS, half, Load::Normal);
        mixed_sub.extend(g.points(START_MS + half, half, Load::High));
        let mut mixed_full = g.points(START_MS, half, Load::Normal);
        mixed_full.extend(g.points(START_MS + half, half + INTERVAL, Load::High));
        let mixed = Windows {
            sub_window: mixed_sub,
            full_window: mixed_full,
        };

        let phase = |g: &mut Generator, n: i64, load: Load| {
            g.points(START_MS + n * full, full, load)
        };

        let transitions = Transitions {
            high_to_normal: vec![
                phase(&mut g, 0, Load::High),
                phase(&mut g, 1, Load::Normal),
            ],
            normal_to_high: vec![
                phase(&mut g, 0, Load::Normal),
                phase(&mut g, 1, Load::High),
            ],
            normal_to_high_to_normal: vec![
                phase(&mut g, 0, Load::Normal),
                phase(&mut g, 1, Load::High),
                phase(&mut g, 2, Load::Normal),
            ],
        };

        Self {
            normal,
            high,
            mixed,
            transitions,
        }
    }
}

/// Span of a sequence in milliseconds (0 when empty).
pub fn span(samples: &[Sample]) -> i64 {
    match (samples.first(), samples.last()) {
        (Some(first), Some(last)) => last.timestamp - first.timestamp,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_have_expected_spans() {
        let data = TestDataPoints::generate(1);
        assert!(span(&data.normal.sub_window) < WINDOW);
        assert!(span(&data.high.sub_window) < WINDOW);
        assert!(span(&data.mixed.sub_window) < WINDOW);
        assert_eq!(span(&data.normal.full_window), WINDOW);
        assert_eq!(span(&data.high.full_window), WINDOW);
        assert_eq!(span(&data.mixed.full_window), WINDOW);
        assert_eq!(data.normal.sub_window.len(), 12);
        assert_eq!(data.high.full_window.len(), 13);
    }

    #[test]
    fn values_respect_threshold() {
        let data = TestDataPoints::generate(2);
        assert!(data.normal.full_window.iter().all(|s| !s.is_high()));
        assert!(data.high.full_window.iter().all(Sample::is_high));
    }

    #[test]
    fn transition_phases_do_not_overlap() {
        let data = TestDataPoints::generate(3);
        for phases in [
            &data.transitions.high_to_normal,
            &data.transitions.normal_to_high,
            &data.transitions.normal_to_high_to_normal,
        ] {
            let joined: Vec<Sample> = phases.iter().flatten().copied().collect();
            assert!(joined.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        }
    }

    #[test]
    fn same_seed_same_values() {
        let a = TestDataPoints::generate(9);
        let b = TestDataPoints::generate(9);
        assert_eq!(a.high.full_window, b.high.full_window);
    }
}
