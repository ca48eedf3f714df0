quantity!(Ohms, via: f64, suffix: "Ω", precision: 3);
