use std::ops::Div;

use crate::quantity::{current::Amps, voltage::Volts};

quantity!(Watts, via: f64, suffix: "W", precision: 1);

impl Div<Volts> for Watts {
    type Output = Amps;

    fn div(self, rhs: Volts) -> Self::Output {
        Amps(self.0 / rhs.0)
    }
}
