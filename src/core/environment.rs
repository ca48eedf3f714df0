use std::f64::consts::TAU;

use chrono::TimeDelta;

use crate::quantity::{irradiance::WattsPerSquareMetre, temperature::Celsius};

pub const MAX_IRRADIANCE: WattsPerSquareMetre = WattsPerSquareMetre(1000.0);
pub const MIN_TEMPERATURE: Celsius = Celsius(-10.0);
pub const MAX_TEMPERATURE: Celsius = Celsius(75.0);

/// Environmental conditions sampled for one tick, clamped to the ranges the
/// electrical model is valid for.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Environment {
    irradiance: WattsPerSquareMetre,
    temperature: Celsius,
}

impl Environment {
    pub fn new(irradiance: WattsPerSquareMetre, temperature: Celsius) -> Self {
        Self {
            irradiance: irradiance.clamp(WattsPerSquareMetre::ZERO, MAX_IRRADIANCE),
            temperature: temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
        }
    }

    pub const fn irradiance(&self) -> WattsPerSquareMetre {
        self.irradiance
    }

    pub const fn temperature(&self) -> Celsius {
        self.temperature
    }
}

/// Irradiance source for the simulated sky.
#[derive(Copy, Clone)]
pub enum SkyProfile {
    /// Externally configured constant.
    Fixed(WattsPerSquareMetre),

    /// Slow sinusoid swinging between zero and the peak irradiance.
    Diurnal {
        peak: WattsPerSquareMetre,
        period: TimeDelta,
    },
}

impl SkyProfile {
    pub fn irradiance_at(&self, elapsed: TimeDelta) -> WattsPerSquareMetre {
        match *self {
            Self::Fixed(irradiance) => irradiance,
            Self::Diurnal { peak, period } => {
                let phase = TAU * elapsed.as_seconds_f64() / period.as_seconds_f64();
                peak * (0.5 * (1.0 + phase.sin()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn clamps_out_of_range_inputs() {
        let environment = Environment::new(WattsPerSquareMetre(1500.0), Celsius(90.0));
        assert_eq!(environment.irradiance(), MAX_IRRADIANCE);
        assert_eq!(environment.temperature(), MAX_TEMPERATURE);

        let environment = Environment::new(WattsPerSquareMetre(-10.0), Celsius(-40.0));
        assert_eq!(environment.irradiance(), WattsPerSquareMetre::ZERO);
        assert_eq!(environment.temperature(), MIN_TEMPERATURE);
    }

    #[test]
    fn diurnal_profile_swings_between_zero_and_peak() {
        let profile = SkyProfile::Diurnal {
            peak: WattsPerSquareMetre(1000.0),
            period: TimeDelta::seconds(120),
        };
        assert_relative_eq!(profile.irradiance_at(TimeDelta::zero()).0, 500.0);
        assert_relative_eq!(profile.irradiance_at(TimeDelta::seconds(30)).0, 1000.0, epsilon = 1e-9);
        assert_relative_eq!(profile.irradiance_at(TimeDelta::seconds(90)).0, 0.0, epsilon = 1e-9);
    }
}
