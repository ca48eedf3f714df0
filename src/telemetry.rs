//! Wire types of the controller connection: telemetry frames outward,
//! command strings inward.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Deserializer};

use crate::{
    prelude::*,
    quantity::{current::Amps, power::Watts, voltage::Volts},
};

/// One telemetry frame, as carried on the wire.
///
/// All numeric fields are in SI base units. Missing or unrecognized optional
/// fields fall back to zero or [`Mode::Off`] so that frames from older
/// firmware still decode.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Telemetry {
    #[serde(rename = "v", default)]
    pub voltage: Volts,

    #[serde(rename = "i", default)]
    pub current: Amps,

    #[serde(rename = "p", default)]
    pub power: Watts,

    /// Battery terminal voltage.
    #[serde(rename = "batt", default)]
    pub battery_voltage: Volts,

    #[serde(rename = "mode", default, deserialize_with = "deserialize_mode")]
    pub mode: Mode,

    #[serde(
        rename = "warn",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_warning"
    )]
    pub warning: Option<Warning>,

    /// Free-form status text.
    #[serde(rename = "sys", default)]
    pub status: String,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    Auto,
    Manual,

    #[default]
    Off,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "AUTO" => Ok(Self::Auto),
            "MANUAL" => Ok(Self::Manual),
            "OFF" => Ok(Self::Off),
            _ => bail!("unrecognized mode: `{tag}`"),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(formatter, "AUTO"),
            Self::Manual => write!(formatter, "MANUAL"),
            Self::Off => write!(formatter, "OFF"),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Warning {
    LowPower,
}

impl FromStr for Warning {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "LOW_POWER" => Ok(Self::LowPower),
            _ => bail!("unrecognized warning: `{tag}`"),
        }
    }
}

impl Display for Warning {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowPower => write!(formatter, "LOW_POWER"),
        }
    }
}

/// An unknown tag decodes as the default rather than poisoning the frame.
fn deserialize_mode<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Mode, D::Error> {
    Ok(String::deserialize(deserializer)?.parse().unwrap_or_default())
}

fn deserialize_warning<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Warning>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|tag| tag.parse().ok()))
}

/// Discrete command for the charge controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Step the converter duty down.
    BuckOn,

    /// Step the converter duty up.
    BoostOn,

    /// Force the converter duty to the minimum.
    AllOff,

    /// Mode label only: enable the tracking loop.
    Auto,

    /// Mode label only: disable the tracking loop.
    Manual,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self> {
        match tag {
            "BUCK_ON" => Ok(Self::BuckOn),
            "BOOST_ON" => Ok(Self::BoostOn),
            "ALL_OFF" => Ok(Self::AllOff),
            "AUTO" => Ok(Self::Auto),
            "MANUAL" => Ok(Self::Manual),
            _ => bail!("unrecognized command: `{tag}`"),
        }
    }
}

impl Display for Command {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BuckOn => write!(formatter, "BUCK_ON"),
            Self::BoostOn => write!(formatter, "BOOST_ON"),
            Self::AllOff => write!(formatter, "ALL_OFF"),
            Self::Auto => write!(formatter, "AUTO"),
            Self::Manual => write!(formatter, "MANUAL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_full_frame() -> Result {
        let frame: Telemetry = serde_json::from_str(
            r#"{"v": 17.3, "i": 4.9, "p": 84.8, "batt": 13.1, "mode": "AUTO", "warn": "LOW_POWER", "sys": "ok"}"#,
        )?;
        assert_eq!(frame.voltage, Volts(17.3));
        assert_eq!(frame.mode, Mode::Auto);
        assert_eq!(frame.warning, Some(Warning::LowPower));
        assert_eq!(frame.status, "ok");
        Ok(())
    }

    /// Optional fields fall back to zero and `OFF`.
    #[test]
    fn decode_minimal_frame() -> Result {
        let frame: Telemetry = serde_json::from_str(r#"{"v": 1.5, "i": 0.1, "p": 0.15}"#)?;
        assert_eq!(frame.battery_voltage, Volts::ZERO);
        assert_eq!(frame.mode, Mode::Off);
        assert_eq!(frame.warning, None);
        assert_eq!(frame.status, "");
        Ok(())
    }

    /// Unknown tags and extra fields must not poison the frame.
    #[test]
    fn decode_is_tolerant() -> Result {
        let frame: Telemetry = serde_json::from_str(
            r#"{"v": 1.0, "mode": "TURBO", "warn": "ON_FIRE", "extra": 42}"#,
        )?;
        assert_eq!(frame.mode, Mode::Off);
        assert_eq!(frame.warning, None);
        Ok(())
    }

    /// A clear frame omits the warning key entirely.
    #[test]
    fn encode_omits_empty_warning() -> Result {
        let frame = Telemetry {
            voltage: Volts(17.3),
            current: Amps(4.9),
            power: Watts(84.8),
            battery_voltage: Volts(13.1),
            mode: Mode::Auto,
            warning: None,
            status: String::new(),
        };
        let encoded = serde_json::to_string(&frame)?;
        assert!(!encoded.contains("warn"));
        assert!(encoded.contains(r#""mode":"AUTO""#));
        Ok(())
    }

    #[test]
    fn command_round_trip() -> Result {
        for command in
            [Command::BuckOn, Command::BoostOn, Command::AllOff, Command::Auto, Command::Manual]
        {
            assert_eq!(command.to_string().parse::<Command>()?, command);
        }
        Ok(())
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!("SELF_DESTRUCT".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }
}
