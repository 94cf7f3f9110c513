//! Catalog categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One hardware category of the catalog.
///
/// Every generation request resolves exactly one entry per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Printer model (kinematics family)
    Printer,
    /// Bed size
    BedSize,
    /// Main control board
    ControlBoard,
    /// Toolhead board
    ToolheadBoard,
    /// Motor kit
    MotorKit,
    /// Extruder model
    Extruder,
    /// Z probe
    Probe,
    /// Print-start macro style
    MacroStyle,
}

impl Category {
    /// All categories in catalog order.
    pub const ALL: [Self; 8] = [
        Self::Printer,
        Self::BedSize,
        Self::ControlBoard,
        Self::ToolheadBoard,
        Self::MotorKit,
        Self::Extruder,
        Self::Probe,
        Self::MacroStyle,
    ];

    /// Snake-case key used in the catalog `defaults` table and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Printer => "printer",
            Self::BedSize => "bed_size",
            Self::ControlBoard => "control_board",
            Self::ToolheadBoard => "toolhead_board",
            Self::MotorKit => "motor_kit",
            Self::Extruder => "extruder",
            Self::Probe => "probe",
            Self::MacroStyle => "macro_style",
        }
    }

    /// Field name used in generation requests.
    #[must_use]
    pub const fn request_field(self) -> &'static str {
        match self {
            Self::Printer => "printerModel",
            Self::BedSize => "bedSize",
            Self::ControlBoard => "controlBoard",
            Self::ToolheadBoard => "toolheadBoard",
            Self::MotorKit => "motorKit",
            Self::Extruder => "extruderModel",
            Self::Probe => "probeType",
            Self::MacroStyle => "macroStyle",
        }
    }

    /// Older request field name still accepted by the resolver.
    #[must_use]
    pub const fn legacy_field(self) -> &'static str {
        match self {
            Self::Printer => "printer",
            Self::BedSize => "size",
            Self::ControlBoard => "main_board",
            Self::ToolheadBoard => "toolhead_board",
            Self::MotorKit => "motors",
            Self::Extruder => "extruder",
            Self::Probe => "probe",
            Self::MacroStyle => "print_start",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Printer => "Printer",
            Self::BedSize => "Bed size",
            Self::ControlBoard => "Control board",
            Self::ToolheadBoard => "Toolhead board",
            Self::MotorKit => "Motor kit",
            Self::Extruder => "Extruder",
            Self::Probe => "Probe",
            Self::MacroStyle => "Macro style",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts the snake-case key, its plural catalog table name, or the
    /// request field name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let singular = normalized.strip_suffix('s').unwrap_or(&normalized);
        Self::ALL
            .into_iter()
            .find(|category| {
                category.as_str() == normalized
                    || category.as_str() == singular
                    || category.request_field().eq_ignore_ascii_case(s.trim())
            })
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
                format!("Unknown category '{s}'. Expected one of: {}", known.join(", "))
            })
    }
}
