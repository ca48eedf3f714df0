use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::curve::Curve,
    quantity::power::Watts,
    telemetry::{Mode, Telemetry},
};

#[must_use]
pub fn build_curve_table(curve: &Curve) -> Table {
    let peak = curve.maximum_power_point();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Voltage", "Current", "Power"]);
    for point in &curve.points {
        let power_cell = Cell::new(point.power).set_alignment(CellAlignment::Right);
        let power_cell = if point.power == peak.power && peak.power > Watts::ZERO {
            power_cell.fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            power_cell
        };
        table.add_row(vec![
            Cell::new(point.voltage).set_alignment(CellAlignment::Right),
            Cell::new(point.current).set_alignment(CellAlignment::Right),
            power_cell,
        ]);
    }
    table
}

#[must_use]
pub fn build_history_table<'a>(frames: impl IntoIterator<Item = &'a Telemetry>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Voltage", "Current", "Power", "Battery", "Mode", "Warning", "Status"]);
    for frame in frames {
        let mode_color = match frame.mode {
            Mode::Auto => Color::Green,
            Mode::Manual => Color::DarkYellow,
            Mode::Off => Color::Reset,
        };
        table.add_row(vec![
            Cell::new(frame.voltage).set_alignment(CellAlignment::Right),
            Cell::new(frame.current).set_alignment(CellAlignment::Right),
            Cell::new(frame.power).set_alignment(CellAlignment::Right),
            Cell::new(frame.battery_voltage).set_alignment(CellAlignment::Right),
            Cell::new(frame.mode).fg(mode_color),
            frame
                .warning
                .map_or_else(|| Cell::new(""), |warning| Cell::new(warning).fg(Color::Red)),
            Cell::new(&frame.status).add_attribute(Attribute::Dim),
        ]);
    }
    table
}
