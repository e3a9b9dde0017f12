//! Styling helpers for terminal output.
//!
//! The [`GameStyle`] trait provides a set of convenience methods for applying
//! ANSI styling via the `colored` crate. Implementations for `&str` and
//! `String` are provided so string literals can be styled directly.

use colored::{ColoredString, Colorize};
use rover_data::CellMarker;

/// Convenience trait for applying color and style to text output.
pub trait GameStyle {
    fn success_style(&self) -> ColoredString;
    fn warning_style(&self) -> ColoredString;
    fn error_style(&self) -> ColoredString;
    fn system_style(&self) -> ColoredString;
    fn operator_style(&self) -> ColoredString;
    fn control_style(&self) -> ColoredString;
    fn heading_style(&self) -> ColoredString;
    fn prompt_style(&self) -> ColoredString;
    fn dim_style(&self) -> ColoredString;
}

impl GameStyle for &str {
    fn success_style(&self) -> ColoredString {
        self.bold().truecolor(60, 220, 90)
    }
    fn warning_style(&self) -> ColoredString {
        self.bold().truecolor(240, 200, 40)
    }
    fn error_style(&self) -> ColoredString {
        self.bold().truecolor(230, 30, 30)
    }
    fn system_style(&self) -> ColoredString {
        self.truecolor(250, 240, 150)
    }
    fn operator_style(&self) -> ColoredString {
        self.truecolor(235, 235, 235)
    }
    fn control_style(&self) -> ColoredString {
        self.truecolor(102, 208, 250)
    }
    fn heading_style(&self) -> ColoredString {
        self.bold().underline().truecolor(240, 200, 40)
    }
    fn prompt_style(&self) -> ColoredString {
        self.bold().truecolor(220, 40, 220)
    }
    fn dim_style(&self) -> ColoredString {
        self.dimmed()
    }
}

impl GameStyle for String {
    fn success_style(&self) -> ColoredString {
        self.as_str().success_style()
    }
    fn warning_style(&self) -> ColoredString {
        self.as_str().warning_style()
    }
    fn error_style(&self) -> ColoredString {
        self.as_str().error_style()
    }
    fn system_style(&self) -> ColoredString {
        self.as_str().system_style()
    }
    fn operator_style(&self) -> ColoredString {
        self.as_str().operator_style()
    }
    fn control_style(&self) -> ColoredString {
        self.as_str().control_style()
    }
    fn heading_style(&self) -> ColoredString {
        self.as_str().heading_style()
    }
    fn prompt_style(&self) -> ColoredString {
        self.as_str().prompt_style()
    }
    fn dim_style(&self) -> ColoredString {
        self.as_str().dim_style()
    }
}

/// Map color for a cell marker.
pub fn marker_style(marker: CellMarker) -> ColoredString {
    let code = marker.code();
    match marker {
        CellMarker::Rover => code.bold().truecolor(80, 160, 255),
        CellMarker::Sample => code.bold().truecolor(60, 220, 90),
        CellMarker::Base => code.bold().truecolor(240, 240, 240),
        CellMarker::Hazard => code.bold().truecolor(230, 30, 30),
        CellMarker::Unknown => code.truecolor(220, 40, 220),
        CellMarker::Charger => code.truecolor(240, 200, 40),
        CellMarker::Explored => code.truecolor(150, 150, 150),
        CellMarker::Path => code.truecolor(110, 110, 110),
    }
}

/// Battery readout colored by charge: red under 30, yellow under 60.
pub fn battery_style(battery: u32) -> ColoredString {
    let text = format!("{battery}%");
    match battery {
        0..30 => text.error_style(),
        30..60 => text.warning_style(),
        _ => text.success_style(),
    }
}
