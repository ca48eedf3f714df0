quantity!(AmpereHours, via: f64, suffix: "Ah", precision: 2);
