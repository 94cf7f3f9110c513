//! Hardware component definitions loaded from the embedded catalog.
//!
//! Every type in this module is deserialized once from `catalog.json` and
//! never mutated afterwards. Fields that hold wiring information use [`Pin`],
//! which keeps the catalog spelling (including `!` and `^` modifiers) intact.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default SPI bus for boards that drive X/Y over SPI without naming a bus.
pub const DEFAULT_SPI_BUS: &str = "spi4";

/// A microcontroller pin identifier exactly as written in the catalog.
///
/// Pins are either port-pin codes (`PB10`) or GPIO indices (`gpio23`),
/// optionally prefixed with `!` (inverted) and/or `^` (pull-up).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pin(String);

impl Pin {
    /// Creates a pin from its raw catalog spelling.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw catalog spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the leading polarity/pull modifiers (may be empty).
    #[must_use]
    pub fn modifiers(&self) -> &str {
        let name_start = self.0.len() - self.name().len();
        &self.0[..name_start]
    }

    /// Returns the pin name without modifiers.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.trim_start_matches(['!', '^', '~'])
    }

    /// Returns the pin with `!` added unless it is already inverted.
    #[must_use]
    pub fn inverted(&self) -> Self {
        if self.modifiers().contains('!') {
            self.clone()
        } else {
            Self(format!("!{}", self.0))
        }
    }

    /// Returns the pin with `^` added unless it already requests a pull-up.
    #[must_use]
    pub fn pulled_up(&self) -> Self {
        if self.modifiers().contains('^') {
            self.clone()
        } else {
            Self(format!("^{}", self.0))
        }
    }

    /// Renders the pin as seen from the host on a secondary MCU.
    ///
    /// Modifiers stay in front of the chip prefix: `!gpio25` on `toolhead`
    /// becomes `!toolhead:gpio25`.
    #[must_use]
    pub fn on_chip(&self, chip: &str) -> String {
        format!("{}{}:{}", self.modifiers(), chip, self.name())
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Z leveling strategy, which also fixes the number of Z motors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leveling {
    /// Four independently driven Z belts leveled with `QUAD_GANTRY_LEVEL`.
    QuadGantry,
    /// Three Z leadscrews leveled with `Z_TILT_ADJUST`.
    ZTilt,
}

impl Leveling {
    /// Number of Z stepper motors this strategy drives.
    #[must_use]
    pub const fn z_motor_count(self) -> usize {
        match self {
            Self::QuadGantry => 4,
            Self::ZTilt => 3,
        }
    }

    /// Config section that implements the strategy.
    #[must_use]
    pub const fn section_name(self) -> &'static str {
        match self {
            Self::QuadGantry => "quad_gantry_level",
            Self::ZTilt => "z_tilt",
        }
    }

    /// G-code command that runs the leveling routine.
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Self::QuadGantry => "QUAD_GANTRY_LEVEL",
            Self::ZTilt => "Z_TILT_ADJUST",
        }
    }

    /// Human-readable label used in macro descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::QuadGantry => "Quad gantry level",
            Self::ZTilt => "Z tilt calibration",
        }
    }
}

/// Global motion limits for a printer model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionLimits {
    /// Maximum toolhead velocity (mm/s)
    pub max_velocity: u32,
    /// Maximum toolhead acceleration (mm/s^2)
    pub max_accel: u32,
    /// Maximum Z velocity (mm/s)
    pub max_z_velocity: u32,
    /// Maximum Z acceleration (mm/s^2)
    pub max_z_accel: u32,
    /// Square corner velocity (mm/s)
    pub square_corner_velocity: f64,
}

/// A printer model (kinematics family).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrinterModel {
    /// Catalog key (e.g. "voron2.4")
    pub id: String,
    /// Display name (e.g. "Voron 2.4")
    pub name: String,
    /// Z leveling strategy
    pub leveling: Leveling,
    /// Motion limits written to `[printer]`
    pub limits: MotionLimits,
}

/// A bed size with build volume in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedSize {
    /// Catalog key (e.g. "300")
    pub id: String,
    /// Display name (e.g. "300mm")
    pub name: String,
    /// X travel
    pub width: f64,
    /// Y travel
    pub depth: f64,
    /// Z travel
    pub height: f64,
}

/// Stepper driver family, which decides the bus and sense resistor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverFamily {
    /// UART-addressed TMC2209
    #[default]
    Tmc2209,
    /// SPI-addressed high-voltage TMC5160
    Tmc5160,
}

impl DriverFamily {
    /// Klipper section prefix (`[tmc2209 ...]`).
    #[must_use]
    pub const fn section_prefix(self) -> &'static str {
        match self {
            Self::Tmc2209 => "tmc2209",
            Self::Tmc5160 => "tmc5160",
        }
    }

    /// Fixed sense resistor value for the family.
    #[must_use]
    pub const fn sense_resistor(self) -> &'static str {
        match self {
            Self::Tmc2209 => "0.110",
            Self::Tmc5160 => "0.075",
        }
    }

    /// Whether the family is addressed over SPI.
    #[must_use]
    pub const fn is_spi(self) -> bool {
        matches!(self, Self::Tmc5160)
    }
}

/// Pin that addresses a stepper driver: chip select for SPI, UART otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DriverPin {
    /// SPI chip select
    Spi {
        /// Chip select pin
        cs: Pin,
    },
    /// Single-wire UART
    Uart {
        /// UART pin
        uart: Pin,
    },
}

impl DriverPin {
    /// Returns the underlying pin.
    #[must_use]
    pub fn pin(&self) -> &Pin {
        match self {
            Self::Spi { cs } => cs,
            Self::Uart { uart } => uart,
        }
    }

    /// Whether this is a chip-select pin.
    #[must_use]
    pub const fn is_spi(&self) -> bool {
        matches!(self, Self::Spi { .. })
    }
}

/// Step/dir/enable wiring of one stepper socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepperPins {
    /// Step pin
    pub step: Pin,
    /// Direction pin
    pub dir: Pin,
    /// Enable pin (active low on every supported board)
    pub enable: Pin,
    /// Driver addressing pin
    #[serde(flatten)]
    pub driver: DriverPin,
}

/// All stepper sockets of a control board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSteppers {
    /// B motor (X)
    pub x: StepperPins,
    /// A motor (Y)
    pub y: StepperPins,
    /// Z0
    pub z: StepperPins,
    /// Z1
    pub z1: StepperPins,
    /// Z2
    pub z2: StepperPins,
    /// Z3 (unused on three-motor printers)
    pub z3: StepperPins,
    /// Extruder socket on the main board
    pub extruder: StepperPins,
}

impl BoardSteppers {
    /// Z sockets in wiring order, paired with their Klipper stepper names.
    #[must_use]
    pub fn z_sockets(&self) -> [(&'static str, &StepperPins); 4] {
        [
            ("stepper_z", &self.z),
            ("stepper_z1", &self.z1),
            ("stepper_z2", &self.z2),
            ("stepper_z3", &self.z3),
        ]
    }
}

/// Heater outputs of a control board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaterPins {
    /// Bed SSR output
    pub bed: Pin,
    /// Hotend heater output (used when no toolhead board drives it)
    pub extruder: Pin,
}

/// Thermistor inputs of a control board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermistorPins {
    /// Bed thermistor
    pub bed: Pin,
    /// Chamber thermistor
    pub chamber: Pin,
}

/// Fan outputs of a control board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFanPins {
    /// Part cooling fan
    pub part_cooling: Pin,
    /// Hotend fan
    pub hotend: Pin,
    /// Electronics bay fan
    pub controller: Pin,
}

/// Endstop inputs of a control board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardEndstops {
    /// X endstop
    pub x: Pin,
    /// Y endstop
    pub y: Pin,
    /// Z endstop
    pub z: Pin,
}

/// A main control board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlBoard {
    /// Catalog key (e.g. "leviathan")
    pub id: String,
    /// Display name
    pub name: String,
    /// MCU family (e.g. "stm32f446")
    pub mcu: String,
    /// `/dev/serial/by-id` prefix for the board
    pub serial_port: String,
    /// Driver family used for X and Y
    #[serde(default)]
    pub xy_driver: DriverFamily,
    /// SPI bus for X/Y drivers when they are SPI-addressed
    #[serde(default)]
    pub xy_spi_bus: Option<String>,
    /// Heater outputs
    pub heater_pins: HeaterPins,
    /// Thermistor inputs
    pub thermistor_pins: ThermistorPins,
    /// Fan outputs
    pub fan_pins: BoardFanPins,
    /// Endstop inputs
    pub endstop_pins: BoardEndstops,
    /// Probe input on the main board
    pub probe_pin: Pin,
    /// PWM output driving the chamber lights
    pub case_light_pin: Pin,
    /// Stepper sockets
    pub steppers: BoardSteppers,
}

impl ControlBoard {
    /// SPI bus used by the X/Y drivers.
    #[must_use]
    pub fn spi_bus(&self) -> &str {
        self.xy_spi_bus.as_deref().unwrap_or(DEFAULT_SPI_BUS)
    }
}

/// How the host reaches the toolhead board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connection {
    /// Point-to-point USB serial link
    #[default]
    Serial,
    /// Shared CAN bus addressed by UUID
    Canbus,
}

/// Software-SPI wiring of an onboard accelerometer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelerometerPins {
    /// Chip select
    pub cs: Pin,
    /// Clock
    pub clk: Pin,
    /// MOSI
    pub mosi: Pin,
    /// MISO
    pub miso: Pin,
}

/// Fan outputs of a toolhead board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolheadFanPins {
    /// Part cooling fan
    pub part_cooling: Pin,
    /// Hotend fan
    pub hotend: Pin,
}

/// A toolhead board carrying the extruder, hotend and fans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolheadBoard {
    /// Catalog key (e.g. "nitehawk")
    pub id: String,
    /// Display name
    pub name: String,
    /// MCU family (e.g. "rp2040")
    pub mcu: String,
    /// Connection topology
    #[serde(default)]
    pub connection: Connection,
    /// `/dev/serial/by-id` prefix when connected over USB
    pub serial_port: String,
    /// Placeholder CAN UUID the user must replace
    #[serde(default)]
    pub canbus_uuid: Option<String>,
    /// Hotend heater output
    pub heater_pin: Pin,
    /// Hotend thermistor input
    pub thermistor_pin: Pin,
    /// Fan outputs
    pub fan_pins: ToolheadFanPins,
    /// Probe input
    pub probe_pin: Pin,
    /// Filament runout switch input
    #[serde(default)]
    pub filament_sensor_pin: Option<Pin>,
    /// Extruder stepper socket
    pub stepper: StepperPins,
    /// Onboard accelerometer, if fitted
    #[serde(default)]
    pub accelerometer: Option<AccelerometerPins>,
}

impl ToolheadBoard {
    /// Whether the board is addressed over CAN.
    #[must_use]
    pub fn is_canbus(&self) -> bool {
        self.connection == Connection::Canbus
    }
}

/// Current and model of one motor in a kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorSpec {
    /// RMS run current, written verbatim
    pub current: String,
    /// Motor part number
    pub model: String,
}

/// A motor kit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorKit {
    /// Catalog key
    pub id: String,
    /// Display name
    pub name: String,
    /// X motor
    pub x: MotorSpec,
    /// Y motor
    pub y: MotorSpec,
    /// Z motors (all share one current)
    pub z: MotorSpec,
}

/// An extruder model; every value is written to the config verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtruderModel {
    /// Catalog key
    pub id: String,
    /// Display name
    pub name: String,
    /// Manufacturer family
    pub family: String,
    /// Gear ratio (e.g. "9:1")
    pub gear_ratio: String,
    /// Rotation distance
    pub rotation_distance: String,
    /// Nozzle diameter
    pub nozzle_diameter: String,
    /// Filament diameter
    pub filament_diameter: String,
    /// Maximum extrude-only move length
    pub max_extrude_only_distance: String,
    /// Maximum extrude-only velocity
    pub max_extrude_only_velocity: String,
    /// Pressure advance
    pub pressure_advance: String,
    /// Pressure advance smooth time
    pub pressure_advance_smooth_time: String,
    /// Extruder motor run current
    pub run_current: String,
}

/// Which board the probe signal is wired to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinSource {
    /// Probe input of the toolhead board
    Toolhead,
    /// Probe input of the main board
    Board,
}

/// Probe capability type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProbeKind {
    /// Contact switch probe read through an MCU input pin
    Switch {
        /// Board carrying the probe input
        pin_source: PinSource,
        /// Request the MCU pull-up on the input
        #[serde(default)]
        pull_up: bool,
    },
    /// Self-contained eddy/contact sensor module with its own USB link
    Beacon {
        /// `/dev/serial/by-id` prefix of the module
        serial_port: String,
    },
}

/// A Z probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeModel {
    /// Catalog key
    pub id: String,
    /// Display name
    pub name: String,
    /// Capability type
    #[serde(flatten)]
    pub kind: ProbeKind,
}

impl ProbeModel {
    /// Whether the probe module performs Z homing itself.
    #[must_use]
    pub fn owns_homing(&self) -> bool {
        matches!(self.kind, ProbeKind::Beacon { .. })
    }
}

/// Macro flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacroFlavor {
    /// Plain heat, level, prime sequence
    #[default]
    Minimal,
    /// Chamber soak and adaptive mesh branching
    Enhanced,
}

/// A print-start macro style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroStyle {
    /// Catalog key
    pub id: String,
    /// Display name
    pub name: String,
    /// One-line description
    pub description: String,
    /// Macro flavor
    pub flavor: MacroFlavor,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_modifiers_and_name() {
        let pin = Pin::new("!^PB10");
        assert_eq!(pin.modifiers(), "!^");
        assert_eq!(pin.name(), "PB10");

        let plain = Pin::new("gpio23");
        assert_eq!(plain.modifiers(), "");
        assert_eq!(plain.name(), "gpio23");
    }

    #[test]
    fn test_pin_on_chip_keeps_modifiers_in_front() {
        assert_eq!(Pin::new("!gpio25").on_chip("toolhead"), "!toolhead:gpio25");
        assert_eq!(Pin::new("gpio9").on_chip("toolhead"), "toolhead:gpio9");
    }

    #[test]
    fn test_pin_inverted_is_idempotent() {
        let pin = Pin::new("PG0").inverted();
        assert_eq!(pin.as_str(), "!PG0");
        assert_eq!(pin.inverted().as_str(), "!PG0");
        assert_eq!(Pin::new("gpio10").pulled_up().pulled_up().as_str(), "^gpio10");
    }

    #[test]
    fn test_driver_pin_untagged_deserialization() {
        let spi: StepperPins =
            serde_json::from_str(r#"{"step":"PB10","dir":"PB11","enable":"PG0","cs":"PE15"}"#)
                .unwrap();
        assert!(spi.driver.is_spi());
        assert_eq!(spi.driver.pin().as_str(), "PE15");

        let uart: StepperPins =
            serde_json::from_str(r#"{"step":"PD4","dir":"PD3","enable":"PD7","uart":"PD5"}"#)
                .unwrap();
        assert!(!uart.driver.is_spi());
    }

    #[test]
    fn test_probe_kind_tagged_deserialization() {
        let tap: ProbeModel = serde_json::from_str(
            r#"{"id":"tap","name":"Voron Tap","type":"switch",
                "pin_source":"toolhead","pull_up":true}"#,
        )
        .unwrap();
        assert!(!tap.owns_homing());

        let beacon: ProbeModel = serde_json::from_str(
            r#"{"id":"beacon","name":"Beacon","type":"beacon","serial_port":"/dev/x"}"#,
        )
        .unwrap();
        assert!(beacon.owns_homing());
    }

    #[test]
    fn test_leveling_motor_counts() {
        assert_eq!(Leveling::QuadGantry.z_motor_count(), 4);
        assert_eq!(Leveling::ZTilt.z_motor_count(), 3);
        assert_eq!(Leveling::ZTilt.section_name(), "z_tilt");
    }

    #[test]
    fn test_driver_family_sense_resistors_differ() {
        assert_eq!(DriverFamily::Tmc5160.sense_resistor(), "0.075");
        assert_eq!(DriverFamily::Tmc2209.sense_resistor(), "0.110");
        assert!(DriverFamily::Tmc5160.is_spi());
    }
}
