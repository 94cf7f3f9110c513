//! Embedded hardware catalog.
//!
//! The catalog is compiled into the binary from `catalog.json`, parsed once
//! into a [`Registry`] and shared read-only afterwards. Loading validates the
//! data: a catalog that cannot produce a complete selection is a build
//! defect, so every integrity problem is reported as a [`CatalogError`].

use crate::models::{
    BedSize, Category, ControlBoard, ExtruderModel, MacroStyle, MotorKit, Pin, PrinterModel,
    ProbeModel, StepperPins, ToolheadBoard,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Pin families understood by the generators: `PB10` style port pins and
/// `gpio23` style RP2040 pins, with optional `!`, `^` or `~` modifiers.
const PIN_PATTERN: &str = r"^[!^~]*(P[A-K]\d{1,2}|gpio\d{1,2})$";

/// Integrity failure of the embedded catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The JSON could not be parsed into the catalog schema.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// A category has no entries at all.
    #[error("catalog category '{0}' has no entries")]
    EmptyCategory(Category),

    /// Two entries in one category share a key.
    #[error("duplicate key '{key}' in catalog category '{category}'")]
    DuplicateKey {
        /// Category containing the duplicate
        category: Category,
        /// Repeated key
        key: String,
    },

    /// The `defaults` table has no entry for a category.
    #[error("no default declared for catalog category '{0}'")]
    NoDefault(Category),

    /// The default key of a category is not one of its entries.
    #[error("default '{key}' for catalog category '{category}' does not exist")]
    MissingDefault {
        /// Category with the dangling default
        category: Category,
        /// Declared default key
        key: String,
    },

    /// A pin does not belong to a supported pin family.
    #[error("invalid pin '{pin}' for {field} on '{entry}'")]
    InvalidPin {
        /// Entry key
        entry: String,
        /// Logical pin function
        field: String,
        /// Offending value
        pin: String,
    },

    /// Stepper wiring disagrees with the declared driver family.
    #[error("'{entry}' {socket} driver wiring: {message}")]
    DriverMismatch {
        /// Entry key
        entry: String,
        /// Stepper socket
        socket: String,
        /// What is wrong
        message: String,
    },

    /// An entry carries an impossible value.
    #[error("invalid value for {field} on '{entry}': {message}")]
    InvalidValue {
        /// Entry key
        entry: String,
        /// Field name
        field: String,
        /// What is wrong
        message: String,
    },

    /// The pin pattern failed to compile.
    #[error("invalid pin pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Common view over entries of any category.
pub trait CatalogEntry {
    /// Stable lookup key.
    fn key(&self) -> &str;
    /// Human-readable name.
    fn name(&self) -> &str;
}

macro_rules! impl_catalog_entry {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CatalogEntry for $ty {
                fn key(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

impl_catalog_entry!(
    PrinterModel,
    BedSize,
    ControlBoard,
    ToolheadBoard,
    MotorKit,
    ExtruderModel,
    ProbeModel,
    MacroStyle,
);

/// Entries of one category with O(1) lookup and a guaranteed default.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    entries: Vec<T>,
    lookup: HashMap<String, usize>,
    default_index: usize,
}

impl<T: CatalogEntry> Catalog<T> {
    fn build(
        category: Category,
        entries: Vec<T>,
        defaults: &HashMap<Category, String>,
    ) -> Result<Self, CatalogError> {
        let default_key = default_for(defaults, category)?;
        if entries.is_empty() {
            return Err(CatalogError::EmptyCategory(category));
        }

        let mut lookup = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            if lookup.insert(entry.key().to_string(), idx).is_some() {
                return Err(CatalogError::DuplicateKey {
                    category,
                    key: entry.key().to_string(),
                });
            }
        }

        let default_index =
            *lookup
                .get(default_key)
                .ok_or_else(|| CatalogError::MissingDefault {
                    category,
                    key: default_key.to_string(),
                })?;

        Ok(Self {
            entries,
            lookup,
            default_index,
        })
    }

    /// Gets an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.lookup.get(key).and_then(|idx| self.entries.get(*idx))
    }

    /// The category default.
    #[must_use]
    pub fn default_entry(&self) -> &T {
        &self.entries[self.default_index]
    }

    /// All entries in catalog order.
    #[must_use]
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a loaded catalog; present for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// On-disk schema of `catalog.json`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: String,
    defaults: HashMap<Category, String>,
    printers: Vec<PrinterModel>,
    bed_sizes: Vec<BedSize>,
    control_boards: Vec<ControlBoard>,
    toolhead_boards: Vec<ToolheadBoard>,
    motor_kits: Vec<MotorKit>,
    extruders: Vec<ExtruderModel>,
    probes: Vec<ProbeModel>,
    macro_styles: Vec<MacroStyle>,
}

/// Id and name of one entry, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    /// Lookup key
    pub id: String,
    /// Display name
    pub name: String,
    /// Whether this entry is the category default
    #[serde(default)]
    pub default: bool,
}

/// Listing of every category, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    /// Catalog version
    pub version: String,
    /// Entries per category, keyed by category name
    pub categories: BTreeMap<Category, Vec<EntrySummary>>,
}

/// Immutable, process-wide set of component catalogs.
#[derive(Debug, Clone)]
pub struct Registry {
    version: String,
    /// Printer models
    pub printers: Catalog<PrinterModel>,
    /// Bed sizes
    pub bed_sizes: Catalog<BedSize>,
    /// Control boards
    pub control_boards: Catalog<ControlBoard>,
    /// Toolhead boards
    pub toolhead_boards: Catalog<ToolheadBoard>,
    /// Motor kits
    pub motor_kits: Catalog<MotorKit>,
    /// Extruders
    pub extruders: Catalog<ExtruderModel>,
    /// Probes
    pub probes: Catalog<ProbeModel>,
    /// Macro styles
    pub macro_styles: Catalog<MacroStyle>,
}

impl Registry {
    /// Loads the registry from the embedded `catalog.json`.
    pub fn load() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("catalog.json"))
    }

    /// Loads and validates a registry from catalog JSON.
    ///
    /// Used by [`Registry::load`] and by tests that need a reduced catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;

        let defaults = &file.defaults;

        let registry = Self {
            printers: Catalog::build(Category::Printer, file.printers, defaults)?,
            bed_sizes: Catalog::build(Category::BedSize, file.bed_sizes, defaults)?,
            control_boards: Catalog::build(Category::ControlBoard, file.control_boards, defaults)?,
            toolhead_boards: Catalog::build(
                Category::ToolheadBoard,
                file.toolhead_boards,
                defaults,
            )?,
            motor_kits: Catalog::build(Category::MotorKit, file.motor_kits, defaults)?,
            extruders: Catalog::build(Category::Extruder, file.extruders, defaults)?,
            probes: Catalog::build(Category::Probe, file.probes, defaults)?,
            macro_styles: Catalog::build(Category::MacroStyle, file.macro_styles, defaults)?,
            version: file.version,
        };

        registry.validate()?;

        tracing::debug!(
            "Loaded catalog v{} ({} boards, {} toolheads, {} extruders)",
            registry.version,
            registry.control_boards.len(),
            registry.toolhead_boards.len(),
            registry.extruders.len()
        );

        Ok(registry)
    }

    /// Catalog version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Looks up any entry by category and key.
    #[must_use]
    pub fn lookup(&self, category: Category, key: &str) -> Option<&dyn CatalogEntry> {
        match category {
            Category::Printer => self.printers.get(key).map(|e| e as &dyn CatalogEntry),
            Category::BedSize => self.bed_sizes.get(key).map(|e| e as &dyn CatalogEntry),
            Category::ControlBoard => {
                self.control_boards.get(key).map(|e| e as &dyn CatalogEntry)
            }
            Category::ToolheadBoard => {
                self.toolhead_boards.get(key).map(|e| e as &dyn CatalogEntry)
            }
            Category::MotorKit => self.motor_kits.get(key).map(|e| e as &dyn CatalogEntry),
            Category::Extruder => self.extruders.get(key).map(|e| e as &dyn CatalogEntry),
            Category::Probe => self.probes.get(key).map(|e| e as &dyn CatalogEntry),
            Category::MacroStyle => self.macro_styles.get(key).map(|e| e as &dyn CatalogEntry),
        }
    }

    /// Entries of one category as trait objects, in catalog order.
    #[must_use]
    pub fn entries(&self, category: Category) -> Vec<&dyn CatalogEntry> {
        fn erase<T: CatalogEntry>(catalog: &Catalog<T>) -> Vec<&dyn CatalogEntry> {
            catalog.entries().iter().map(|e| e as &dyn CatalogEntry).collect()
        }

        match category {
            Category::Printer => erase(&self.printers),
            Category::BedSize => erase(&self.bed_sizes),
            Category::ControlBoard => erase(&self.control_boards),
            Category::ToolheadBoard => erase(&self.toolhead_boards),
            Category::MotorKit => erase(&self.motor_kits),
            Category::Extruder => erase(&self.extruders),
            Category::Probe => erase(&self.probes),
            Category::MacroStyle => erase(&self.macro_styles),
        }
    }

    /// Key of the category default.
    #[must_use]
    pub fn default_key(&self, category: Category) -> &str {
        match category {
            Category::Printer => self.printers.default_entry().key(),
            Category::BedSize => self.bed_sizes.default_entry().key(),
            Category::ControlBoard => self.control_boards.default_entry().key(),
            Category::ToolheadBoard => self.toolhead_boards.default_entry().key(),
            Category::MotorKit => self.motor_kits.default_entry().key(),
            Category::Extruder => self.extruders.default_entry().key(),
            Category::Probe => self.probes.default_entry().key(),
            Category::MacroStyle => self.macro_styles.default_entry().key(),
        }
    }

    /// Id/name listing of every category.
    #[must_use]
    pub fn summary(&self) -> CatalogSummary {
        let categories = Category::ALL
            .into_iter()
            .map(|category| {
                let default_key = self.default_key(category);
                let entries = self
                    .entries(category)
                    .into_iter()
                    .map(|entry| EntrySummary {
                        id: entry.key().to_string(),
                        name: entry.name().to_string(),
                        default: entry.key() == default_key,
                    })
                    .collect();
                (category, entries)
            })
            .collect();

        CatalogSummary {
            version: self.version.clone(),
            categories,
        }
    }

    /// Checks cross-field integrity that serde cannot express.
    fn validate(&self) -> Result<(), CatalogError> {
        let pin_family = Regex::new(PIN_PATTERN)?;

        for bed in self.bed_sizes.entries() {
            let lengths = [
                ("width", bed.width),
                ("depth", bed.depth),
                ("height", bed.height),
            ];
            for (field, value) in lengths {
                if !(value.is_finite() && value > 0.0) {
                    return Err(CatalogError::InvalidValue {
                        entry: bed.id.clone(),
                        field: field.to_string(),
                        message: format!("{value} is not a positive length"),
                    });
                }
            }
        }

        for board in self.control_boards.entries() {
            for (field, pin) in board_pins(board) {
                check_pin(&pin_family, &board.id, &field, pin)?;
            }

            let spi = board.xy_driver.is_spi();
            for (socket, stepper) in [("x", &board.steppers.x), ("y", &board.steppers.y)] {
                if stepper.driver.is_spi() != spi {
                    return Err(CatalogError::DriverMismatch {
                        entry: board.id.clone(),
                        socket: socket.to_string(),
                        message: format!(
                            "{} requires a {} pin",
                            board.xy_driver.section_prefix(),
                            if spi { "cs" } else { "uart" }
                        ),
                    });
                }
            }
            for (socket, stepper) in board.steppers.z_sockets() {
                require_uart(&board.id, socket, stepper)?;
            }
            require_uart(&board.id, "extruder", &board.steppers.extruder)?;
        }

        for toolhead in self.toolhead_boards.entries() {
            for (field, pin) in toolhead_pins(toolhead) {
                check_pin(&pin_family, &toolhead.id, &field, pin)?;
            }
            require_uart(&toolhead.id, "extruder", &toolhead.stepper)?;

            if toolhead.is_canbus() && toolhead.canbus_uuid.as_deref().is_none_or(str::is_empty) {
                return Err(CatalogError::InvalidValue {
                    entry: toolhead.id.clone(),
                    field: "canbus_uuid".to_string(),
                    message: "CAN toolhead needs a placeholder UUID".to_string(),
                });
            }
        }

        Ok(())
    }
}

fn default_for(
    defaults: &HashMap<Category, String>,
    category: Category,
) -> Result<&str, CatalogError> {
    defaults
        .get(&category)
        .map(String::as_str)
        .ok_or(CatalogError::NoDefault(category))
}

fn check_pin(pattern: &Regex, entry: &str, field: &str, pin: &Pin) -> Result<(), CatalogError> {
    if pattern.is_match(pin.as_str()) {
        Ok(())
    } else {
        Err(CatalogError::InvalidPin {
            entry: entry.to_string(),
            field: field.to_string(),
            pin: pin.as_str().to_string(),
        })
    }
}

fn require_uart(entry: &str, socket: &str, stepper: &StepperPins) -> Result<(), CatalogError> {
    if stepper.driver.is_spi() {
        return Err(CatalogError::DriverMismatch {
            entry: entry.to_string(),
            socket: socket.to_string(),
            message: "tmc2209 requires a uart pin".to_string(),
        });
    }
    Ok(())
}

fn stepper_pins<'a>(socket: &str, stepper: &'a StepperPins) -> [(String, &'a Pin); 4] {
    [
        (format!("{socket}.step"), &stepper.step),
        (format!("{socket}.dir"), &stepper.dir),
        (format!("{socket}.enable"), &stepper.enable),
        (format!("{socket}.driver"), stepper.driver.pin()),
    ]
}

fn board_pins(board: &ControlBoard) -> Vec<(String, &Pin)> {
    let mut pins = vec![
        ("bed.heater".to_string(), &board.heater_pins.bed),
        ("extruder.heater".to_string(), &board.heater_pins.extruder),
        ("bed.thermistor".to_string(), &board.thermistor_pins.bed),
        ("chamber.thermistor".to_string(), &board.thermistor_pins.chamber),
        ("fan.part_cooling".to_string(), &board.fan_pins.part_cooling),
        ("fan.hotend".to_string(), &board.fan_pins.hotend),
        ("fan.controller".to_string(), &board.fan_pins.controller),
        ("endstop.x".to_string(), &board.endstop_pins.x),
        ("endstop.y".to_string(), &board.endstop_pins.y),
        ("endstop.z".to_string(), &board.endstop_pins.z),
        ("probe".to_string(), &board.probe_pin),
        ("case_light".to_string(), &board.case_light_pin),
    ];
    let steppers = &board.steppers;
    for (socket, stepper) in [
        ("x", &steppers.x),
        ("y", &steppers.y),
        ("z", &steppers.z),
        ("z1", &steppers.z1),
        ("z2", &steppers.z2),
        ("z3", &steppers.z3),
        ("extruder", &steppers.extruder),
    ] {
        pins.extend(stepper_pins(socket, stepper));
    }
    pins
}

fn toolhead_pins(toolhead: &ToolheadBoard) -> Vec<(String, &Pin)> {
    let mut pins = vec![
        ("heater".to_string(), &toolhead.heater_pin),
        ("thermistor".to_string(), &toolhead.thermistor_pin),
        ("fan.part_cooling".to_string(), &toolhead.fan_pins.part_cooling),
        ("fan.hotend".to_string(), &toolhead.fan_pins.hotend),
        ("probe".to_string(), &toolhead.probe_pin),
    ];
    if let Some(pin) = &toolhead.filament_sensor_pin {
        pins.push(("filament_sensor".to_string(), pin));
    }
    pins.extend(stepper_pins("extruder", &toolhead.stepper));
    if let Some(accel) = &toolhead.accelerometer {
        pins.extend([
            ("accelerometer.cs".to_string(), &accel.cs),
            ("accelerometer.clk".to_string(), &accel.clk),
            ("accelerometer.mosi".to_string(), &accel.mosi),
            ("accelerometer.miso".to_string(), &accel.miso),
        ]);
    }
    pins
}
