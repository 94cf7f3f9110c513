//! Toolhead MCU, extruder and toolhead appendices.

use super::steppers::driver_block;
use crate::models::{
    BedGeometry, ConfigBlock, DriverFamily, DriverPin, GeneratedSection, Pin, ResolvedSelection,
    SectionKind,
};

/// Name of the toolhead MCU as referenced in pin prefixes.
pub const TOOLHEAD_MCU: &str = "toolhead";

/// Hotend thermistor fitted to the supported hotends.
const HOTEND_SENSOR: &str = "ATC Semitec 104NT-4-R025H42";

/// `[mcu toolhead]`, addressed by CAN UUID or by serial path.
#[must_use]
pub fn mcu_block(sel: &ResolvedSelection<'_>) -> ConfigBlock {
    let toolhead = sel.toolhead();
    let block = ConfigBlock::new(format!("mcu {TOOLHEAD_MCU}")).preamble(format!(
        "{} ({})",
        toolhead.name,
        toolhead.mcu.to_uppercase()
    ));

    let block = if toolhead.is_canbus() {
        block
            .preamble("Find the UUID with: python3 ~/klipper/scripts/canbus_query.py can0")
            .kv(
                "canbus_uuid",
                toolhead.canbus_uuid.as_deref().unwrap_or("update_me"),
            )
            .comment(
                "Replace the placeholder UUID above with the value reported by canbus_query.py",
            )
            .comment("canbus_interface: can0")
    } else {
        block
            .preamble("Obtain the path with \"ls -l /dev/serial/by-id/\" then unplug to verify")
            .kv("serial", &toolhead.serial_port)
    };

    block.kv("restart_method", "command")
}

/// `[extruder]` and its driver, plus the runout sensor when the toolhead has one.
#[must_use]
pub fn extruder(sel: &ResolvedSelection<'_>) -> GeneratedSection {
    let toolhead = sel.toolhead();
    let extruder = sel.extruder();
    let pins = &toolhead.stepper;

    let main = ConfigBlock::new("extruder")
        .preamble(format!(
            "{} ({} family) on {}",
            extruder.name, extruder.family, toolhead.name
        ))
        .kv("step_pin", pins.step.on_chip(TOOLHEAD_MCU))
        .kv("dir_pin", pins.dir.on_chip(TOOLHEAD_MCU))
        .kv("enable_pin", pins.enable.inverted().on_chip(TOOLHEAD_MCU))
        .comment("Calibrate: new = old * actual_extruded / requested")
        .kv("rotation_distance", &extruder.rotation_distance)
        .kv("gear_ratio", &extruder.gear_ratio)
        .kv("microsteps", 16)
        .kv("full_steps_per_rotation", 200)
        .kv("nozzle_diameter", &extruder.nozzle_diameter)
        .kv("filament_diameter", &extruder.filament_diameter)
        .kv("max_extrude_only_distance", &extruder.max_extrude_only_distance)
        .kv("max_extrude_only_velocity", &extruder.max_extrude_only_velocity)
        .kv("heater_pin", toolhead.heater_pin.on_chip(TOOLHEAD_MCU))
        .kv("sensor_type", HOTEND_SENSOR)
        .kv("sensor_pin", toolhead.thermistor_pin.on_chip(TOOLHEAD_MCU))
        .kv("min_temp", 0)
        .kv("max_temp", 270)
        .kv("max_power", "1.0")
        .kv("min_extrude_temp", 170)
        .kv("control", "pid")
        .kv("pid_kp", "26.213")
        .kv("pid_ki", "1.304")
        .kv("pid_kd", "131.721")
        .kv("pressure_advance", &extruder.pressure_advance)
        .kv("pressure_advance_smooth_time", &extruder.pressure_advance_smooth_time);

    let driver_pin = match &pins.driver {
        DriverPin::Uart { uart } => DriverPin::Uart {
            uart: Pin::new(uart.on_chip(TOOLHEAD_MCU)),
        },
        DriverPin::Spi { cs } => DriverPin::Spi {
            cs: Pin::new(cs.on_chip(TOOLHEAD_MCU)),
        },
    };
    let driver = driver_block(
        "extruder",
        DriverFamily::Tmc2209,
        &driver_pin,
        "",
        &extruder.run_current,
        false,
    );

    let mut blocks = vec![main, driver];
    if let Some(pin) = &toolhead.filament_sensor_pin {
        blocks.push(
            ConfigBlock::new("filament_switch_sensor filament_sensor")
                .kv("switch_pin", pin.pulled_up().on_chip(TOOLHEAD_MCU))
                .kv("pause_on_runout", true)
                .kv("runout_gcode", "M600"),
        );
    }

    GeneratedSection::new(SectionKind::Extruder, blocks)
}

/// `[adxl345]` and `[resonance_tester]` when the toolhead carries an accelerometer.
#[must_use]
pub fn accelerometer(sel: &ResolvedSelection<'_>, geo: &BedGeometry) -> Option<GeneratedSection> {
    let accel = sel.toolhead().accelerometer.as_ref()?;

    let adxl = ConfigBlock::new("adxl345")
        .preamble("Onboard accelerometer for input shaping")
        .kv("cs_pin", accel.cs.on_chip(TOOLHEAD_MCU))
        .kv("spi_software_sclk_pin", accel.clk.on_chip(TOOLHEAD_MCU))
        .kv("spi_software_mosi_pin", accel.mosi.on_chip(TOOLHEAD_MCU))
        .kv("spi_software_miso_pin", accel.miso.on_chip(TOOLHEAD_MCU))
        .kv("axes_map", "x,y,z")
        .comment("Adjust axes_map to match the mounting orientation");

    let tester = ConfigBlock::new("resonance_tester")
        .kv("accel_chip", "adxl345")
        .multiline("probe_points", [geo.resonance_point.to_string()]);

    Some(GeneratedSection::new(
        SectionKind::AccelerometerAppendix,
        vec![adxl, tester],
    ))
}

/// Setup notes appended for CAN bus toolheads.
#[must_use]
pub fn can_notes(sel: &ResolvedSelection<'_>) -> Option<GeneratedSection> {
    let toolhead = sel.toolhead();
    if !toolhead.is_canbus() {
        return None;
    }

    let notes = ConfigBlock::notes([
        "1. Flash the main board with CAN bus support (USB to CAN bridge on can0).".to_string(),
        format!("2. Flash the {} with Katapult and CAN enabled.", toolhead.name),
        "3. Run: python3 ~/klipper/scripts/canbus_query.py can0".to_string(),
        format!(
            "   and replace canbus_uuid '{}' in [mcu {TOOLHEAD_MCU}] with the reported UUID.",
            toolhead.canbus_uuid.as_deref().unwrap_or("update_me")
        ),
        "4. Connect CAN_H and CAN_L and make sure one 120 ohm terminator is fitted.".to_string(),
        "See https://www.klipper3d.org/CANBUS.html".to_string(),
    ]);

    Some(GeneratedSection::new(SectionKind::CanBusAppendix, vec![notes]))
}
