use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    core::{diode::DiodeEquation, environment::Environment, module::ModuleParameters},
    quantity::{current::Amps, power::Watts, temperature::Kelvin, voltage::Volts},
};

/// Fixed number of voltage samples per sweep.
pub const SAMPLE_COUNT: usize = 81;

/// One sample of the I-V/P-V characteristic.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CurvePoint {
    pub voltage: Volts,
    pub current: Amps,
    pub power: Watts,
}

/// I-V/P-V characteristic for one set of environmental conditions, sampled
/// on ascending voltages from zero to the estimated open-circuit voltage.
pub struct Curve {
    pub points: Vec<CurvePoint>,
    pub open_circuit_voltage: Volts,
    pub light_current: Amps,
}

impl Curve {
    #[expect(clippy::cast_precision_loss)]
    pub fn generate(environment: Environment, module: &ModuleParameters) -> Self {
        let temperature = Kelvin::from(environment.temperature());
        let thermal_voltage = module.thermal_voltage(temperature);
        let light_current = module.light_current(environment.irradiance());
        let saturation_current = module.saturation_current(temperature);
        let open_circuit_voltage = module.open_circuit_voltage(environment.temperature());

        let step = open_circuit_voltage / (SAMPLE_COUNT - 1) as f64;
        let points = (0..SAMPLE_COUNT)
            .map(|index| {
                let voltage = step * index as f64;
                let current = DiodeEquation::builder()
                    .voltage(voltage)
                    .light_current(light_current)
                    .saturation_current(saturation_current)
                    .series_resistance(module.series_resistance)
                    .shunt_resistance(module.shunt_resistance)
                    .ideality(module.ideality)
                    .thermal_voltage(thermal_voltage)
                    .build()
                    .solve();
                CurvePoint { voltage, current, power: voltage * current }
            })
            .collect();

        Self { points, open_circuit_voltage, light_current }
    }

    /// Sample closest in voltage to the target: a linear scan, no
    /// interpolation, which is fine at this sample count.
    pub fn nearest_point(&self, target: Volts) -> CurvePoint {
        self.points
            .iter()
            .copied()
            .min_by_key(|point| OrderedFloat((point.voltage - target).0.abs()))
            .unwrap_or_default()
    }

    pub fn maximum_power_point(&self) -> CurvePoint {
        self.points
            .iter()
            .position_max_by_key(|point| OrderedFloat(point.power.0))
            .map_or_else(CurvePoint::default, |index| self.points[index])
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::quantity::{irradiance::WattsPerSquareMetre, resistance::Ohms, temperature::Celsius};

    fn module(ideality: f64) -> ModuleParameters {
        ModuleParameters::builder()
            .cell_count(36)
            .light_current_stc(Amps(5.5))
            .saturation_current_stc(Amps(1e-9))
            .series_resistance(Ohms(0.25))
            .shunt_resistance(Ohms(200.0))
            .ideality(ideality)
            .build()
    }

    fn noon() -> Environment {
        Environment::new(WattsPerSquareMetre(1000.0), Celsius(25.0))
    }

    /// Full sun at 25 °C with the default module.
    #[test]
    fn full_sun() {
        let curve = Curve::generate(noon(), &module(1.3));
        assert_eq!(curve.points.len(), SAMPLE_COUNT);
        assert_relative_eq!(curve.open_circuit_voltage.0, 21.6, epsilon = 1e-9);
        assert_relative_eq!(curve.light_current.0, 5.5);
        assert_relative_eq!(curve.points[0].voltage.0, 0.0);
        assert_relative_eq!(curve.points[SAMPLE_COUNT - 1].voltage.0, 21.6, epsilon = 1e-9);
        assert!(curve.maximum_power_point().power > Watts::ZERO);
    }

    /// At unit ideality the sweep ceiling sits above the knee, so the power
    /// maximum falls strictly inside the sweep.
    #[test]
    fn peak_is_interior() {
        let curve = Curve::generate(noon(), &module(1.0));
        let peak = curve.maximum_power_point();
        assert!(peak.voltage > Volts::ZERO);
        assert!(peak.voltage < curve.open_circuit_voltage);
        assert!(peak.power > Watts::ZERO);
    }

    /// Without light the curve carries no current anywhere.
    #[test]
    fn dark_curve_is_flat() {
        let environment = Environment::new(WattsPerSquareMetre::ZERO, Celsius(25.0));
        let curve = Curve::generate(environment, &module(1.3));
        assert_eq!(curve.light_current, Amps::ZERO);
        for point in &curve.points {
            assert!(point.current <= Amps(1e-6));
            assert!(point.current >= Amps::ZERO);
        }
    }

    /// Current never increases with voltage, over randomized parameter sets.
    #[test]
    fn current_is_non_increasing() {
        let mut rng = StdRng::seed_from_u64(0x5147);
        for _ in 0..25 {
            let module = ModuleParameters::builder()
                .cell_count(rng.gen_range(24..=96))
                .light_current_stc(Amps(rng.gen_range(1.0..8.0)))
                .saturation_current_stc(Amps(10f64.powf(rng.gen_range(-10.0..-8.0))))
                .series_resistance(Ohms(rng.gen_range(0.05..0.5)))
                .shunt_resistance(Ohms(rng.gen_range(50.0..500.0)))
                .ideality(rng.gen_range(1.0..1.8))
                .build();
            let environment = Environment::new(
                WattsPerSquareMetre(rng.gen_range(0.0..1000.0)),
                Celsius(rng.gen_range(-10.0..75.0)),
            );
            let curve = Curve::generate(environment, &module);
            for (left, right) in curve.points.iter().tuple_windows() {
                assert!(
                    right.current <= left.current + Amps(1e-3),
                    "current rose from {left:?} to {right:?}",
                );
            }
        }
    }

    /// Regenerating with identical inputs is bit-identical: no hidden state.
    #[test]
    fn generation_is_deterministic() {
        let first = Curve::generate(noon(), &module(1.3));
        let second = Curve::generate(noon(), &module(1.3));
        for (left, right) in first.points.iter().zip(&second.points) {
            assert_eq!(left.voltage.0.to_bits(), right.voltage.0.to_bits());
            assert_eq!(left.current.0.to_bits(), right.current.0.to_bits());
            assert_eq!(left.power.0.to_bits(), right.power.0.to_bits());
        }
    }

    #[test]
    fn nearest_point_scan() {
        let curve = Curve::generate(noon(), &module(1.3));
        let step = 21.6 / 80.0;
        let nearest = curve.nearest_point(Volts(step * 10.4));
        assert_relative_eq!(nearest.voltage.0, step * 10.0, epsilon = 1e-9);
        let nearest = curve.nearest_point(Volts(1000.0));
        assert_relative_eq!(nearest.voltage.0, 21.6, epsilon = 1e-9);
    }
}
