//! Bed heater, fans and temperature sensors.
//!
//! These sections vary only by pin assignment.

use super::toolhead::TOOLHEAD_MCU;
use crate::models::{ConfigBlock, GeneratedSection, ResolvedSelection, SectionKind};

const BED_SENSOR: &str = "Generic 3950";
const CHAMBER_SENSOR: &str = "ATC Semitec 104NT-4-R025H42";

/// `[heater_bed]` on the main board.
#[must_use]
pub fn bed_heater(sel: &ResolvedSelection<'_>) -> GeneratedSection {
    let board = sel.board();

    let block = ConfigBlock::new("heater_bed")
        .preamble("SSR output and bed thermistor on the main board")
        .kv("heater_pin", &board.heater_pins.bed)
        .kv("sensor_type", BED_SENSOR)
        .kv("sensor_pin", &board.thermistor_pins.bed)
        .comment("Keep max_power around 0.4 W/cm^2 to avoid warping the bed")
        .kv("max_power", "0.6")
        .kv("min_temp", 0)
        .kv("max_temp", 120)
        .kv("control", "pid")
        .kv("pid_kp", "58.437")
        .kv("pid_ki", "2.347")
        .kv("pid_kd", "363.769");

    GeneratedSection::new(SectionKind::BedHeater, vec![block])
}

/// Part fan, hotend fan, controller fan, temperature sensors and case light.
#[must_use]
pub fn fans_and_sensors(sel: &ResolvedSelection<'_>) -> GeneratedSection {
    let board = sel.board();
    let toolhead = sel.toolhead();

    let part_fan = ConfigBlock::new("fan")
        .preamble("Part cooling fan")
        .kv("pin", toolhead.fan_pins.part_cooling.on_chip(TOOLHEAD_MCU))
        .kv("kick_start_time", "0.5")
        .kv("off_below", "0.10");

    let hotend_fan = ConfigBlock::new("heater_fan hotend_fan")
        .kv("pin", toolhead.fan_pins.hotend.on_chip(TOOLHEAD_MCU))
        .kv("max_power", "1.0")
        .kv("kick_start_time", "0.5")
        .kv("heater", "extruder")
        .kv("heater_temp", "50.0");

    let controller_fan = ConfigBlock::new("temperature_fan controller_fan")
        .preamble("Electronics bay fan, driven by host temperature")
        .kv("pin", &board.fan_pins.controller)
        .kv("max_power", "1.0")
        .kv("shutdown_speed", "0.0")
        .kv("cycle_time", "0.010")
        .kv("sensor_type", "temperature_host")
        .kv("control", "watermark")
        .kv("max_delta", "2.0")
        .kv("min_temp", 0)
        .kv("max_temp", 85)
        .kv("target_temp", 50);

    let chamber = ConfigBlock::new("temperature_sensor chamber_temp")
        .kv("sensor_type", CHAMBER_SENSOR)
        .kv("sensor_pin", &board.thermistor_pins.chamber)
        .kv("min_temp", 0)
        .kv("max_temp", 100)
        .kv("gcode_id", "chamber_th");

    let host = ConfigBlock::new("temperature_sensor raspberry_pi")
        .kv("sensor_type", "temperature_host")
        .kv("min_temp", 0)
        .kv("max_temp", 100);

    let mcu = ConfigBlock::new("temperature_sensor mcu_temp")
        .kv("sensor_type", "temperature_mcu")
        .kv("min_temp", 0)
        .kv("max_temp", 100);

    let case_light = ConfigBlock::new("output_pin caselight")
        .preamble("Chamber lighting")
        .kv("pin", &board.case_light_pin)
        .kv("pwm", true)
        .kv("hardware_pwm", false)
        .kv("value", "0.20")
        .kv("shutdown_value", 0)
        .kv("cycle_time", "0.00025");

    GeneratedSection::new(
        SectionKind::Thermal,
        vec![part_fan, hotend_fan, controller_fan, chamber, host, mcu, case_light],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::fixture;
    use crate::models::Category;

    #[test]
    fn test_bed_heater_uses_board_pins() {
        fixture(&[(Category::ControlBoard, "octopus_pro")], |sel, _| {
            let section = bed_heater(sel);
            let bed = section.block("heater_bed").unwrap();
            assert_eq!(bed.get("heater_pin"), Some("PA0"));
            assert_eq!(bed.get("sensor_pin"), Some("PF3"));
        });
    }

    #[test]
    fn test_toolhead_fans_are_prefixed() {
        fixture(&[(Category::ToolheadBoard, "nitehawk")], |sel, _| {
            let section = fans_and_sensors(sel);
            assert_eq!(section.block("fan").unwrap().get("pin"), Some("toolhead:gpio6"));
            assert_eq!(
                section.block("heater_fan hotend_fan").unwrap().get("pin"),
                Some("toolhead:gpio5")
            );
            assert_eq!(
                section.block("temperature_fan controller_fan").unwrap().get("pin"),
                Some("PF7")
            );
        });
    }
}
