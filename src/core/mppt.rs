use crate::quantity::power::Watts;

pub const MIN_DUTY: f64 = 0.05;
pub const MAX_DUTY: f64 = 0.95;

/// Perturbation applied on every update.
const DUTY_STEP: f64 = 0.008;

/// Step applied by the discrete buck/boost overrides.
const OVERRIDE_STEP: f64 = 0.05;

/// Power gains below this are treated as noise and trigger a reversal.
const IMPROVEMENT_THRESHOLD: Watts = Watts(1e-4);

/// Perturb-and-Observe hill climber.
///
/// Does not converge to an exact maximum: once near the peak it keeps
/// oscillating within one duty step of it, which is the expected behavior of
/// the algorithm rather than a defect.
#[derive(Clone)]
pub struct Mppt {
    duty: f64,
    previous_power: Watts,
    direction: f64,
}

impl Mppt {
    pub fn new(duty: f64) -> Self {
        Self { duty: duty.clamp(MIN_DUTY, MAX_DUTY), previous_power: Watts::ZERO, direction: 1.0 }
    }

    pub const fn duty(&self) -> f64 {
        self.duty
    }

    /// One P&O update from the power at the present operating point.
    ///
    /// Keeps perturbing in the same direction while the power improves,
    /// reverses otherwise. Returns the new duty cycle.
    pub fn update(&mut self, power: Watts) -> f64 {
        if power - self.previous_power <= IMPROVEMENT_THRESHOLD {
            self.direction = -self.direction;
        }
        self.duty = (self.duty + self.direction * DUTY_STEP).clamp(MIN_DUTY, MAX_DUTY);
        self.previous_power = power;
        self.duty
    }

    /// Step the duty down, flooring at the minimum.
    pub fn buck(&mut self) {
        self.duty = (self.duty - OVERRIDE_STEP).max(MIN_DUTY);
    }

    /// Step the duty up, capping at the maximum.
    pub fn boost(&mut self) {
        self.duty = (self.duty + OVERRIDE_STEP).min(MAX_DUTY);
    }

    /// Force the duty to the minimum.
    pub fn shut_off(&mut self) {
        self.duty = MIN_DUTY;
    }
}
