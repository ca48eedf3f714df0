use crate::quantity::{current::Amps, resistance::Ohms, voltage::Volts};

/// Iteration budget, not a convergence guarantee: results near the knee of
/// the curve may remain approximate.
const MAX_ITERATIONS: usize = 60;

/// Early-stop threshold on the Newton update magnitude, amps.
const TOLERANCE: f64 = 1e-7;

/// Cap on the exponent argument, past which `exp` would overflow.
const MAX_EXPONENT: f64 = 700.0;

/// Offset added to every divisor.
const EPSILON: f64 = 1e-12;

/// Single-diode equation pinned at one terminal voltage:
///
/// `I − IL + I0·(exp((V + I·Rs)/(n·Vt)) − 1) + (V + I·Rs)/Rsh = 0`
#[derive(bon::Builder)]
pub struct DiodeEquation {
    pub voltage: Volts,
    pub light_current: Amps,
    pub saturation_current: Amps,
    pub series_resistance: Ohms,
    pub shunt_resistance: Ohms,
    pub ideality: f64,

    /// Thermal voltage of the whole module.
    pub thermal_voltage: Volts,
}

impl DiodeEquation {
    /// Solve for the module current with Newton-Raphson.
    ///
    /// Never fails: a diverging iteration resets to zero and stops, and the
    /// result is clamped to be non-negative (reverse current is not modeled).
    pub fn solve(&self) -> Amps {
        let mut current =
            (self.light_current.0 - self.voltage.0 / (self.shunt_resistance.0 + EPSILON)).max(0.0);
        for _ in 0..MAX_ITERATIONS {
            let update = self.residual(current) / self.derivative(current);
            current -= update;
            if !current.is_finite() {
                current = 0.0;
                break;
            }
            if update.abs() < TOLERANCE {
                break;
            }
        }
        Amps(current.max(0.0))
    }

    fn exponential(&self, current: f64) -> f64 {
        let exponent = (self.voltage.0 + current * self.series_resistance.0)
            / (self.ideality * self.thermal_voltage.0 + EPSILON);
        exponent.min(MAX_EXPONENT).exp()
    }

    fn residual(&self, current: f64) -> f64 {
        let diode_voltage = self.voltage.0 + current * self.series_resistance.0;
        current - self.light_current.0
            + self.saturation_current.0 * (self.exponential(current) - 1.0)
            + diode_voltage / (self.shunt_resistance.0 + EPSILON)
    }

    fn derivative(&self, current: f64) -> f64 {
        1.0 + self.saturation_current.0 * self.exponential(current) * self.series_resistance.0
            / (self.ideality * self.thermal_voltage.0 + EPSILON)
            + self.series_resistance.0 / (self.shunt_resistance.0 + EPSILON)
    }
}
