//! Crash point generation.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::GameConfig;

/// Crash point of an instant-crash round.
pub const INSTANT_CRASH: f64 = 1.0;

/// Supplies the crash point of each round. Called exactly once per round, when
/// the round takes off.
pub trait CrashPointSource {
    fn draw(&mut self) -> f64;
}

/// Random crash points: `INSTANT_CRASH` with the configured probability,
/// otherwise uniform over the hundredths in `[crash_min, crash_max)`.
#[derive(Debug, Clone)]
pub struct RandomDraw<R = StdRng> {
    rng: R,
    instant_probability: f64,
    /// Bounds in hundredths, `low..high`.
    low: u32,
    high: u32,
}

impl RandomDraw<StdRng> {
    pub fn from_os_rng(config: &GameConfig) -> Self {
        Self::with_rng(StdRng::from_os_rng(), config)
    }

    /// Reproducible draws for simulations and tests.
    pub fn seeded(seed: u64, config: &GameConfig) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), config)
    }
}

impl<R: Rng> RandomDraw<R> {
    pub fn with_rng(rng: R, config: &GameConfig) -> Self {
        Self {
            rng,
            instant_probability: config.instant_crash_probability,
            low: (config.crash_min * 100.0).round() as u32,
            high: (config.crash_max * 100.0).round() as u32,
        }
    }
}

impl<R: Rng> CrashPointSource for RandomDraw<R> {
    fn draw(&mut self) -> f64 {
        if self.rng.random_bool(self.instant_probability) {
            return INSTANT_CRASH;
        }
        f64::from(self.rng.random_range(self.low..self.high)) / 100.0
    }
}

/// Replays a fixed list of crash points, then repeats the last one.
#[derive(Debug, Clone)]
pub struct ScriptedDraw {
    points: VecDeque<f64>,
    last: f64,
}

impl ScriptedDraw {
    pub fn new(points: impl IntoIterator<Item = f64>) -> Self {
        Self {
            points: points.into_iter().collect(),
            last: INSTANT_CRASH,
        }
    }
}

impl CrashPointSource for ScriptedDraw {
    fn draw(&mut self) -> f64 {
        if let Some(point) = self.points.pop_front() {
            self.last = point;
        }
        self.last
    }
}

impl<T: CrashPointSource + ?Sized> CrashPointSource for Box<T> {
    fn draw(&mut self) -> f64 {
        (**self).draw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_range() {
        let mut draw = RandomDraw::seeded(7, &GameConfig::default());
        for _ in 0..10_000 {
            let point = draw.draw();
            assert!(
                point == INSTANT_CRASH || (1.01..9.01).contains(&point),
                "crash point {point} out of range"
            );
            // two decimals
            assert_eq!((point * 100.0).round() / 100.0, point);
        }
    }

    #[test]
    fn instant_crash_frequency_is_about_ten_percent() {
        let mut draw = RandomDraw::seeded(42, &GameConfig::default());
        let trials = 20_000;
        let instant = (0..trials)
            .filter(|_| draw.draw() == INSTANT_CRASH)
            .count();
        let rate = instant as f64 / trials as f64;
        assert!((0.08..0.12).contains(&rate), "instant crash rate {rate}");
    }

    #[test]
    fn regular_draws_cover_the_range() {
        let config = GameConfig {
            instant_crash_probability: 0.0,
            ..GameConfig::default()
        };
        let mut draw = RandomDraw::seeded(1, &config);
        let points: Vec<f64> = (0..5_000).map(|_| draw.draw()).collect();
        assert!(points.iter().all(|p| *p >= 1.01 && *p < 9.01));
        assert!(points.iter().any(|p| *p < 2.0));
        assert!(points.iter().any(|p| *p > 8.0));
    }

    #[test]
    fn always_instant_when_probability_is_one() {
        let config = GameConfig {
            instant_crash_probability: 1.0,
            ..GameConfig::default()
        };
        let mut draw = RandomDraw::seeded(3, &config);
        assert!((0..100).all(|_| draw.draw() == INSTANT_CRASH));
    }

    #[test]
    fn seeded_draws_are_repeatable() {
        let config = GameConfig::default();
        let mut a = RandomDraw::seeded(99, &config);
        let mut b = RandomDraw::seeded(99, &config);
        let left: Vec<f64> = (0..50).map(|_| a.draw()).collect();
        let right: Vec<f64> = (0..50).map(|_| b.draw()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn scripted_replays_then_repeats_last() {
        let mut draw = ScriptedDraw::new([3.0, 1.5]);
        assert_eq!(draw.draw(), 3.0);
        assert_eq!(draw.draw(), 1.5);
        assert_eq!(draw.draw(), 1.5);
    }
}
