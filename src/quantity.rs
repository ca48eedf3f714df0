#[macro_use]
pub mod macros;

pub mod charge;
pub mod current;
pub mod irradiance;
pub mod power;
pub mod resistance;
pub mod temperature;
pub mod time;
pub mod voltage;
