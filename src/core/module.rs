use crate::quantity::{
    current::Amps,
    irradiance::WattsPerSquareMetre,
    resistance::Ohms,
    temperature::{Celsius, Kelvin},
    voltage::Volts,
};

/// Boltzmann constant over the elementary charge, volts per kelvin.
const BOLTZMANN_OVER_CHARGE: f64 = 1.380649e-23 / 1.602176634e-19;

/// Band-gap energy of crystalline silicon used in the saturation current
/// temperature law, electron-volts.
const BAND_GAP: f64 = 1.2;

/// Electrical parameters of one PV module, fixed for a simulation session.
#[derive(Copy, Clone, Debug, bon::Builder, serde::Deserialize)]
pub struct ModuleParameters {
    /// Number of series-connected cells.
    pub cell_count: u32,

    /// Light-generated current at standard test conditions.
    pub light_current_stc: Amps,

    /// Diode reverse saturation current at standard test conditions.
    pub saturation_current_stc: Amps,

    pub series_resistance: Ohms,
    pub shunt_resistance: Ohms,

    /// Diode ideality factor.
    pub ideality: f64,
}

impl ModuleParameters {
    pub fn thermal_voltage_per_cell(temperature: Kelvin) -> Volts {
        Volts(BOLTZMANN_OVER_CHARGE * temperature.0)
    }

    pub fn thermal_voltage(&self, temperature: Kelvin) -> Volts {
        Self::thermal_voltage_per_cell(temperature) * f64::from(self.cell_count)
    }

    /// Light-generated current scaled linearly with irradiance.
    pub fn light_current(&self, irradiance: WattsPerSquareMetre) -> Amps {
        self.light_current_stc * (irradiance.0 / 1000.0)
    }

    /// Saturation current scaled with the cube power law and the band-gap
    /// exponential, normalized to the STC value at 25 °C.
    pub fn saturation_current(&self, temperature: Kelvin) -> Amps {
        let thermal_voltage_stc = Self::thermal_voltage_per_cell(Kelvin::STC);
        let thermal_voltage = Self::thermal_voltage_per_cell(temperature);
        self.saturation_current_stc
            * (temperature.0 / Kelvin::STC.0).powi(3)
            * (BAND_GAP / thermal_voltage_stc.0 - BAND_GAP / thermal_voltage.0).exp()
    }

    /// Linear per-cell open-circuit voltage estimate.
    ///
    /// This is not solved from the diode equation and only bounds the sweep
    /// range: the true zero-current voltage of a generated curve may differ.
    pub fn open_circuit_voltage(&self, temperature: Celsius) -> Volts {
        Volts(f64::from(self.cell_count) * (0.6 - 0.002 * (temperature.0 - 25.0)))
    }
}
