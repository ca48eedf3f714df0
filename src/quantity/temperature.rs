quantity!(Celsius, via: f64, suffix: "°C", precision: 1);
quantity!(Kelvin, via: f64, suffix: "K", precision: 2);

impl Kelvin {
    /// Standard test conditions, 25 °C.
    pub const STC: Self = Self(298.15);
}

impl From<Celsius> for Kelvin {
    fn from(celsius: Celsius) -> Self {
        Self(celsius.0 + 273.15)
    }
}
