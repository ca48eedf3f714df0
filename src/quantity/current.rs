use std::ops::Mul;

use crate::quantity::{charge::AmpereHours, power::Watts, time::Hours, voltage::Volts};

quantity!(Amps, via: f64, suffix: "A", precision: 2);

impl Mul<Volts> for Amps {
    type Output = Watts;

    fn mul(self, rhs: Volts) -> Self::Output {
        Watts(self.0 * rhs.0)
    }
}

impl Mul<Hours> for Amps {
    type Output = AmpereHours;

    fn mul(self, rhs: Hours) -> Self::Output {
        AmpereHours(self.0 * rhs.0)
    }
}
