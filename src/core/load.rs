use std::f64::consts::TAU;

use chrono::TimeDelta;

use crate::quantity::power::Watts;

/// Simulated household load on the battery bus.
#[derive(Copy, Clone)]
pub struct Load {
    pub base: Watts,

    /// Relative swing of the sinusoidal variation around the base.
    pub swing: f64,

    pub period: TimeDelta,
}

impl Load {
    pub fn household(base: Watts) -> Self {
        Self { base, swing: 0.5, period: TimeDelta::seconds(90) }
    }

    pub fn at(&self, elapsed: TimeDelta) -> Watts {
        let phase = TAU * elapsed.as_seconds_f64() / self.period.as_seconds_f64();
        (self.base * (1.0 + self.swing * phase.sin())).max(Watts::ZERO)
    }
}
