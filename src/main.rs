mod cli;
mod core;
mod link;
mod prelude;
mod quantity;
mod tables;
mod telemetry;

use std::{collections::VecDeque, time::Duration};

use chrono::TimeDelta;
use clap::{Parser, crate_version};

use crate::{
    cli::{Args, BaskArgs, Command, SweepArgs},
    core::{
        battery::Battery,
        curve::Curve,
        environment::{Environment, SkyProfile},
        load::Load,
        mppt::Mppt,
        simulator::Simulator,
    },
    link::{CommandSource, ConsoleCommands, ConsoleSink, TelemetrySink},
    prelude::*,
    tables::{build_curve_table, build_history_table},
};

/// Most recent frames kept for the shutdown summary.
const HISTORY_WINDOW: usize = 120;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .init();
    info!(version = crate_version!(), "starting…");

    match Args::parse().command {
        Command::Bask(args) => bask(*args).await,
        Command::Sweep(args) => sweep(&args),
    }
}

/// Drive the fixed-step loop: telemetry as JSON lines on the standard
/// output, commands parsed from standard input lines.
#[instrument(skip_all)]
async fn bask(args: BaskArgs) -> Result {
    let module = args.module.try_into_parameters()?;
    let sky = if args.auto_sky {
        SkyProfile::Diurnal {
            peak: args.environment.irradiance,
            period: TimeDelta::seconds(args.sky_period_seconds),
        }
    } else {
        SkyProfile::Fixed(args.environment.irradiance)
    };
    let mut simulator = Simulator::builder()
        .module(module)
        .battery(
            Battery::builder()
                .capacity(args.battery.capacity)
                .internal_resistance(args.battery.internal_resistance)
                .state_of_charge(args.battery.initial_state_of_charge)
                .build(),
        )
        .mppt(Mppt::new(args.initial_duty))
        .sky(sky)
        .temperature(args.environment.temperature)
        .load(Load::household(args.load))
        .build();

    let dt = TimeDelta::milliseconds(i64::try_from(args.tick_millis)?);
    let mut ticker = tokio::time::interval(Duration::from_millis(args.tick_millis));
    let mut sink = ConsoleSink::new();
    let mut commands = ConsoleCommands::new();
    let mut history = VecDeque::with_capacity(HISTORY_WINDOW);
    let mut connected = true;
    let mut completed: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let frame = simulator.tick(dt);
                debug!(
                    power = %frame.power,
                    battery_voltage = %frame.battery_voltage,
                    "tick"
                );
                sink.publish(&frame).await?;
                if history.len() == HISTORY_WINDOW {
                    history.pop_front();
                }
                history.push_back(frame);
                completed += 1;
                if args.ticks.is_some_and(|limit| completed >= limit) {
                    break;
                }
            }

            command = commands.next(), if connected => match command {
                Some(command) => {
                    info!(%command, "queued");
                    simulator.submit(command);
                }
                None => {
                    connected = false;
                    warn!("command stream closed");
                }
            },

            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for the interrupt")?;
                info!("interrupted");
                break;
            }
        }
    }

    info!(ticks = completed, "done!");
    println!("{}", build_history_table(&history));
    Ok(())
}

/// Generate and render a single curve.
#[instrument(skip_all)]
fn sweep(args: &SweepArgs) -> Result {
    let module = args.module.try_into_parameters()?;
    let environment = Environment::new(args.environment.irradiance, args.environment.temperature);
    let curve = Curve::generate(environment, &module);
    let peak = curve.maximum_power_point();
    info!(
        open_circuit_voltage = %curve.open_circuit_voltage,
        light_current = %curve.light_current,
        peak_voltage = %peak.voltage,
        peak_power = %peak.power,
        "generated"
    );
    println!("{}", build_curve_table(&curve));
    Ok(())
}
