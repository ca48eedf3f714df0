use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::{
    core::module::ModuleParameters,
    prelude::*,
    quantity::{
        charge::AmpereHours,
        current::Amps,
        irradiance::WattsPerSquareMetre,
        power::Watts,
        resistance::Ohms,
        temperature::Celsius,
    },
};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: run the charge-controller loop and stream telemetry.
    #[clap(name = "bask")]
    Bask(Box<BaskArgs>),

    /// Render one I-V/P-V sweep for the configured module and environment.
    #[clap(name = "sweep")]
    Sweep(Box<SweepArgs>),
}

#[derive(Parser)]
pub struct BaskArgs {
    /// Tick period in milliseconds, both simulated and wall-clock.
    #[clap(long = "tick-millis", default_value = "500", env = "TICK_MILLIS")]
    pub tick_millis: u64,

    /// Stop after this many ticks instead of running until interrupted.
    #[clap(long)]
    pub ticks: Option<u64>,

    /// Follow a slow sinusoidal irradiance profile instead of the fixed value.
    #[clap(long = "auto-sky")]
    pub auto_sky: bool,

    /// Period of the auto sky sinusoid in seconds.
    #[clap(long = "sky-period-seconds", default_value = "120", env = "SKY_PERIOD_SECONDS")]
    pub sky_period_seconds: i64,

    /// Base simulated household load in watts.
    #[clap(long = "load-watts", default_value = "60", env = "LOAD_WATTS")]
    pub load: Watts,

    /// Initial converter duty cycle.
    #[clap(long = "initial-duty", default_value = "0.5", env = "INITIAL_DUTY")]
    pub initial_duty: f64,

    #[clap(flatten)]
    pub environment: EnvironmentArgs,

    #[clap(flatten)]
    pub module: ModuleArgs,

    #[clap(flatten)]
    pub battery: BatteryArgs,
}

#[derive(Parser)]
pub struct SweepArgs {
    #[clap(flatten)]
    pub environment: EnvironmentArgs,

    #[clap(flatten)]
    pub module: ModuleArgs,
}

#[derive(Copy, Clone, Parser)]
pub struct EnvironmentArgs {
    /// Plane-of-module irradiance in watts per square metre.
    #[clap(long, default_value = "1000", env = "IRRADIANCE")]
    pub irradiance: WattsPerSquareMetre,

    /// Module temperature in degrees Celsius.
    #[clap(long, default_value = "25", env = "TEMPERATURE")]
    pub temperature: Celsius,
}

#[derive(Clone, Parser)]
pub struct ModuleArgs {
    /// Number of series-connected cells.
    #[clap(long = "cell-count", default_value = "36", env = "CELL_COUNT")]
    pub cell_count: u32,

    /// Light-generated current at standard test conditions, amps.
    #[clap(long = "light-current-amps", default_value = "5.5", env = "LIGHT_CURRENT_AMPS")]
    pub light_current_stc: Amps,

    /// Diode reverse saturation current at standard test conditions, amps.
    #[clap(
        long = "saturation-current-amps",
        default_value = "1e-9",
        env = "SATURATION_CURRENT_AMPS"
    )]
    pub saturation_current_stc: Amps,

    /// Series resistance, ohms.
    #[clap(long = "series-resistance-ohms", default_value = "0.25", env = "SERIES_RESISTANCE_OHMS")]
    pub series_resistance: Ohms,

    /// Shunt resistance, ohms.
    #[clap(long = "shunt-resistance-ohms", default_value = "200", env = "SHUNT_RESISTANCE_OHMS")]
    pub shunt_resistance: Ohms,

    /// Diode ideality factor.
    #[clap(long, default_value = "1.3", env = "IDEALITY")]
    pub ideality: f64,

    /// Load all module parameters from a TOML file instead of the flags.
    #[clap(long = "module-file", env = "MODULE_FILE")]
    pub module_file: Option<PathBuf>,
}

impl ModuleArgs {
    pub fn try_into_parameters(&self) -> Result<ModuleParameters> {
        if let Some(path) = &self.module_file {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read `{}`", path.display()))?;
            return toml::from_str(&contents).context("failed to parse the module file");
        }
        Ok(ModuleParameters::builder()
            .cell_count(self.cell_count)
            .light_current_stc(self.light_current_stc)
            .saturation_current_stc(self.saturation_current_stc)
            .series_resistance(self.series_resistance)
            .shunt_resistance(self.shunt_resistance)
            .ideality(self.ideality)
            .build())
    }
}

#[derive(Copy, Clone, Parser)]
pub struct BatteryArgs {
    /// Battery capacity in ampere-hours.
    #[clap(long = "battery-capacity-amp-hours", default_value = "100", env = "BATTERY_CAPACITY_AMP_HOURS")]
    pub capacity: AmpereHours,

    /// Battery internal resistance in ohms.
    #[clap(
        long = "battery-internal-resistance-ohms",
        default_value = "0.05",
        env = "BATTERY_INTERNAL_RESISTANCE_OHMS"
    )]
    pub internal_resistance: Ohms,

    /// Initial state of charge, between 0 and 1.
    #[clap(long = "initial-state-of-charge", default_value = "0.6", env = "INITIAL_STATE_OF_CHARGE")]
    pub initial_state_of_charge: f64,
}
