quantity!(WattsPerSquareMetre, via: f64, suffix: "W/m²", precision: 0);
