use chrono::TimeDelta;

use crate::quantity::{
    charge::AmpereHours,
    current::Amps,
    power::Watts,
    resistance::Ohms,
    time::Hours,
    voltage::Volts,
};

/// Offset added to the divisor when converting power to current.
const EPSILON: f64 = 1e-12;

/// Battery simulator.
#[derive(Clone, bon::Builder)]
pub struct Battery {
    capacity: AmpereHours,
    internal_resistance: Ohms,

    /// State of charge, kept in `[0, 1]`.
    state_of_charge: f64,
}

/// One integration step outcome.
#[derive(Copy, Clone, Debug)]
pub struct BatterySample {
    pub state_of_charge: f64,
    pub terminal_voltage: Volts,
    pub current: Amps,
}

impl Battery {
    /// Open-circuit voltage of a 12-volt chemistry, rising with the state of
    /// charge.
    fn open_circuit_voltage(state_of_charge: f64) -> Volts {
        let state_of_charge = state_of_charge.clamp(0.0, 1.0);
        Volts(12.0 + 2.4 * (0.05 + 0.95 * state_of_charge.powf(0.9)))
    }

    /// Integrate the applied power over `dt` and return the new state.
    ///
    /// Positive power charges, negative power discharges. Charge past either
    /// bound is silently discarded by the clamp. The resistive term always
    /// adds magnitude to the terminal voltage, for either current sign.
    pub fn step(&mut self, power: Watts, dt: TimeDelta) -> BatterySample {
        let open_circuit = Self::open_circuit_voltage(self.state_of_charge);
        let current = Amps(power.0 / (open_circuit.0 + EPSILON));
        let delta = current * Hours::from(dt);
        self.state_of_charge = (self.state_of_charge + delta / self.capacity).clamp(0.0, 1.0);
        let terminal_voltage =
            Volts(open_circuit.0 + current.0.signum() * current.0 * self.internal_resistance.0);
        BatterySample { state_of_charge: self.state_of_charge, terminal_voltage, current }
    }
}
