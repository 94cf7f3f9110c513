//! Raw and resolved hardware selections.

use crate::models::category::Category;
use crate::models::components::{
    BedSize, ControlBoard, ExtruderModel, MacroStyle, MotorKit, PrinterModel, ProbeModel,
    ToolheadBoard,
};
use serde_json::Value;
use std::collections::BTreeMap;

/// Selection identifiers exactly as supplied by a caller.
///
/// Every field is optional. Unknown or missing keys are resolved to the
/// catalog default later, so building a `RawSelection` never fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSelection {
    keys: BTreeMap<Category, String>,
}

impl RawSelection {
    /// Creates an empty selection (every category defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the requested key for a category. Blank keys are ignored.
    #[must_use]
    pub fn with(mut self, category: Category, key: impl Into<String>) -> Self {
        self.set(category, key);
        self
    }

    /// Sets the requested key for a category in place.
    pub fn set(&mut self, category: Category, key: impl Into<String>) {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            self.keys.remove(&category);
        } else {
            self.keys.insert(category, trimmed.to_string());
        }
    }

    /// Returns the requested key for a category, if any.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<&str> {
        self.keys.get(&category).map(String::as_str)
    }

    /// Builds a selection from an arbitrary JSON value.
    ///
    /// Accepts both the current field names (`printerModel`, `bedSize`, ...)
    /// and the legacy ones (`printer`, `size`, ...); the current name wins
    /// when both are present. Numbers are accepted anywhere a key is (a bed
    /// size is often sent as `300`). Non-object input and fields of any
    /// other type are ignored.
    #[must_use]
    pub fn from_json_value(value: &Value) -> Self {
        let mut selection = Self::new();
        let Some(object) = value.as_object() else {
            return selection;
        };

        for category in Category::ALL {
            let raw = object
                .get(category.request_field())
                .and_then(key_from_value)
                .or_else(|| object.get(category.legacy_field()).and_then(key_from_value));
            if let Some(key) = raw {
                selection.set(category, key);
            }
        }

        selection
    }

    /// Builds a selection from raw request bytes, falling back to an empty
    /// selection when the body is not valid JSON.
    #[must_use]
    pub fn from_json_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::from_json_value(&value),
            Err(e) => {
                tracing::debug!("Ignoring malformed selection body: {e}");
                Self::new()
            }
        }
    }
}

fn key_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.to_string())
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| format!("{f}"))),
        _ => None,
    }
}

/// Outcome of resolving one category key against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'r, T> {
    /// The requested key exists in the catalog.
    Resolved(&'r T),
    /// The requested key was missing or unknown; the category default was used.
    Defaulted {
        /// What the caller asked for (`None` when the field was absent)
        requested: Option<String>,
        /// The default entry substituted for it
        entry: &'r T,
    },
}

impl<'r, T> Resolution<'r, T> {
    /// The selected catalog entry, whichever way it was reached.
    #[must_use]
    pub fn entry(&self) -> &'r T {
        match self {
            Self::Resolved(entry) | Self::Defaulted { entry, .. } => entry,
        }
    }

    /// Whether the category default was substituted.
    #[must_use]
    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }

    /// The unknown key the caller supplied, if the fallback replaced one.
    #[must_use]
    pub fn requested(&self) -> Option<&str> {
        match self {
            Self::Resolved(_) => None,
            Self::Defaulted { requested, .. } => requested.as_deref(),
        }
    }
}

/// One catalog entry per category, ready for generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSelection<'r> {
    /// Printer model
    pub printer: Resolution<'r, PrinterModel>,
    /// Bed size
    pub bed_size: Resolution<'r, BedSize>,
    /// Main control board
    pub control_board: Resolution<'r, ControlBoard>,
    /// Toolhead board
    pub toolhead_board: Resolution<'r, ToolheadBoard>,
    /// Motor kit
    pub motor_kit: Resolution<'r, MotorKit>,
    /// Extruder model
    pub extruder: Resolution<'r, ExtruderModel>,
    /// Z probe
    pub probe: Resolution<'r, ProbeModel>,
    /// Macro style
    pub macro_style: Resolution<'r, MacroStyle>,
}

impl<'r> ResolvedSelection<'r> {
    /// Selected printer model.
    #[must_use]
    pub fn printer(&self) -> &'r PrinterModel {
        self.printer.entry()
    }

    /// Selected bed size.
    #[must_use]
    pub fn bed_size(&self) -> &'r BedSize {
        self.bed_size.entry()
    }

    /// Selected control board.
    #[must_use]
    pub fn board(&self) -> &'r ControlBoard {
        self.control_board.entry()
    }

    /// Selected toolhead board.
    #[must_use]
    pub fn toolhead(&self) -> &'r ToolheadBoard {
        self.toolhead_board.entry()
    }

    /// Selected motor kit.
    #[must_use]
    pub fn motors(&self) -> &'r MotorKit {
        self.motor_kit.entry()
    }

    /// Selected extruder.
    #[must_use]
    pub fn extruder(&self) -> &'r ExtruderModel {
        self.extruder.entry()
    }

    /// Selected probe.
    #[must_use]
    pub fn probe(&self) -> &'r ProbeModel {
        self.probe.entry()
    }

    /// Selected macro style.
    #[must_use]
    pub fn macro_style(&self) -> &'r MacroStyle {
        self.macro_style.entry()
    }

    /// Categories whose default was substituted, with the key that was asked for.
    #[must_use]
    pub fn defaulted(&self) -> Vec<(Category, Option<&str>)> {
        let all = [
            (Category::Printer, self.printer.is_defaulted(), self.printer.requested()),
            (Category::BedSize, self.bed_size.is_defaulted(), self.bed_size.requested()),
            (
                Category::ControlBoard,
                self.control_board.is_defaulted(),
                self.control_board.requested(),
            ),
            (
                Category::ToolheadBoard,
                self.toolhead_board.is_defaulted(),
                self.toolhead_board.requested(),
            ),
            (Category::MotorKit, self.motor_kit.is_defaulted(), self.motor_kit.requested()),
            (Category::Extruder, self.extruder.is_defaulted(), self.extruder.requested()),
            (Category::Probe, self.probe.is_defaulted(), self.probe.requested()),
            (
                Category::MacroStyle,
                self.macro_style.is_defaulted(),
                self.macro_style.requested(),
            ),
        ];
        all.into_iter()
            .filter(|(_, defaulted, _)| *defaulted)
            .map(|(category, _, requested)| (category, requested))
            .collect()
    }

    /// Display names of every resolved entry, keyed by category.
    #[must_use]
    pub fn labels(&self) -> BTreeMap<Category, &'r str> {
        BTreeMap::from([
            (Category::Printer, self.printer().name.as_str()),
            (Category::BedSize, self.bed_size().name.as_str()),
            (Category::ControlBoard, self.board().name.as_str()),
            (Category::ToolheadBoard, self.toolhead().name.as_str()),
            (Category::MotorKit, self.motors().name.as_str()),
            (Category::Extruder, self.extruder().name.as_str()),
            (Category::Probe, self.probe().name.as_str()),
            (Category::MacroStyle, self.macro_style().name.as_str()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_accepts_current_field_names() {
        let raw = RawSelection::from_json_value(&json!({
            "printerModel": "trident",
            "bedSize": 350,
            "controlBoard": "octopus_pro",
        }));
        assert_eq!(raw.get(Category::Printer), Some("trident"));
        assert_eq!(raw.get(Category::BedSize), Some("350"));
        assert_eq!(raw.get(Category::ControlBoard), Some("octopus_pro"));
        assert_eq!(raw.get(Category::Probe), None);
    }

    #[test]
    fn test_from_json_accepts_legacy_aliases() {
        let raw = RawSelection::from_json_value(&json!({
            "printer": "trident",
            "size": "250",
            "main_board": "spider_v23",
            "print_start": "better",
        }));
        assert_eq!(raw.get(Category::Printer), Some("trident"));
        assert_eq!(raw.get(Category::BedSize), Some("250"));
        assert_eq!(raw.get(Category::ControlBoard), Some("spider_v23"));
        assert_eq!(raw.get(Category::MacroStyle), Some("better"));
    }

    #[test]
    fn test_current_field_wins_over_legacy() {
        let raw = RawSelection::from_json_value(&json!({
            "printer": "trident",
            "printerModel": "voron2.4",
        }));
        assert_eq!(raw.get(Category::Printer), Some("voron2.4"));
    }

    #[test]
    fn test_malformed_input_yields_empty_selection() {
        assert_eq!(RawSelection::from_json_value(&json!([1, 2, 3])), RawSelection::new());
        assert_eq!(RawSelection::from_json_bytes(b"{not json"), RawSelection::new());

        let raw = RawSelection::from_json_value(&json!({
            "bedSize": {"nested": true},
            "probeType": null
        }));
        assert_eq!(raw, RawSelection::new());
    }

    #[test]
    fn test_blank_keys_are_ignored() {
        let raw = RawSelection::new()
            .with(Category::Probe, "beacon")
            .with(Category::Probe, "   ");
        assert_eq!(raw.get(Category::Probe), None);
    }
}
