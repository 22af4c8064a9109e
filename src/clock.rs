//! Multiplier growth while a round is flying.

/// Round to two decimals, the precision multipliers are compared and shown at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One growth step: `current + 0.01 * (current * rate)`.
pub fn grow(current: f64, rate: f64) -> f64 {
    current + 0.01 * (current * rate)
}

/// Growing multiplier.
///
/// The unrounded accumulator is what grows from tick to tick; only the value
/// handed out is rounded. Feeding the rounded value back in would stall growth
/// near 1.00 (a 0.15% step rounds away) and shift every crash.
#[derive(Debug, Clone)]
pub struct MultiplierClock {
    accumulator: f64,
    rate: f64,
}

impl MultiplierClock {
    pub const BASELINE: f64 = 1.0;

    pub fn new(rate: f64) -> Self {
        Self {
            accumulator: Self::BASELINE,
            rate,
        }
    }

    pub fn reset(&mut self) {
        self.accumulator = Self::BASELINE;
    }

    /// Advance one tick and return the rounded multiplier.
    pub fn advance(&mut self) -> f64 {
        self.accumulator = grow(self.accumulator, self.rate);
        self.value()
    }

    /// Rounded multiplier.
    pub fn value(&self) -> f64 {
        round2(self.accumulator)
    }

    pub fn raw(&self) -> f64 {
        self.accumulator
    }
}
