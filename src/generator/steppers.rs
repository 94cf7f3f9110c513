//! X/Y drive and Z axis generators.

use crate::models::{
    BedGeometry, ConfigBlock, DriverFamily, DriverPin, GeneratedSection, Leveling,
    LevelingGeometry, MotorSpec, Pin, ResolvedSelection, SectionKind, StepperPins,
};

const BELT_ROTATION_DISTANCE: u32 = 40;
const MICROSTEPS: u32 = 16;

/// Step/dir/enable lines shared by every stepper block. Enable is active low.
fn stepper_block(name: &str, pins: &StepperPins) -> ConfigBlock {
    ConfigBlock::new(name)
        .kv("step_pin", &pins.step)
        .kv("dir_pin", &pins.dir)
        .kv("enable_pin", pins.enable.inverted())
}

/// Driver block for a stepper.
///
/// SPI drivers get bus and chip select, UART drivers get the UART pin. The
/// sense resistor is fixed by the driver family.
pub(crate) fn driver_block(
    stepper: &str,
    family: DriverFamily,
    pin: &DriverPin,
    spi_bus: &str,
    run_current: &str,
    interpolate: bool,
) -> ConfigBlock {
    let block = ConfigBlock::new(format!("{} {stepper}", family.section_prefix()));
    let block = match pin {
        DriverPin::Spi { cs } => block.kv("spi_bus", spi_bus).kv("cs_pin", cs),
        DriverPin::Uart { uart } => block.kv("uart_pin", uart),
    };
    block
        .kv("interpolate", interpolate)
        .kv("run_current", run_current)
        .kv("sense_resistor", family.sense_resistor())
        .kv("stealthchop_threshold", 0)
}

/// `[stepper_x]`/`[stepper_y]` with their driver blocks.
#[must_use]
pub fn xy_axes(sel: &ResolvedSelection<'_>, geo: &BedGeometry) -> GeneratedSection {
    let board = sel.board();
    let motors = sel.motors();

    let axes: [(&str, &str, &StepperPins, &Pin, f64, &MotorSpec); 2] = [
        ("x", "B", &board.steppers.x, &board.endstop_pins.x, geo.width, &motors.x),
        ("y", "A", &board.steppers.y, &board.endstop_pins.y, geo.depth, &motors.y),
    ];

    let mut blocks = Vec::with_capacity(4);
    for (axis, motor, pins, endstop, travel, spec) in axes {
        let name = format!("stepper_{axis}");
        blocks.push(
            stepper_block(&name, pins)
                .preamble(format!(
                    "{motor} stepper ({}): {}",
                    axis.to_uppercase(),
                    spec.model
                ))
                .kv("rotation_distance", BELT_ROTATION_DISTANCE)
                .kv("microsteps", MICROSTEPS)
                .kv("full_steps_per_rotation", 200)
                .kv("endstop_pin", endstop)
                .kv("position_min", 0)
                .kv("position_endstop", travel)
                .kv("position_max", travel)
                .kv("homing_speed", 100)
                .kv("homing_retract_dist", 5)
                .kv("homing_positive_dir", true),
        );
        blocks.push(driver_block(
            &name,
            board.xy_driver,
            &pins.driver,
            board.spi_bus(),
            &spec.current,
            false,
        ));
    }

    GeneratedSection::new(SectionKind::XyAxes, blocks)
}

/// Z steppers for the printer's leveling strategy plus exactly one leveling block.
#[must_use]
pub fn z_axes(sel: &ResolvedSelection<'_>, geo: &BedGeometry) -> GeneratedSection {
    let board = sel.board();
    let leveling = sel.printer().leveling;
    let z_motor = &sel.motors().z;

    let mut blocks = Vec::new();
    for (idx, (name, pins)) in board
        .steppers
        .z_sockets()
        .into_iter()
        .take(leveling.z_motor_count())
        .enumerate()
    {
        let mut stepper = stepper_block(name, pins)
            .kv("rotation_distance", BELT_ROTATION_DISTANCE)
            .kv("microsteps", MICROSTEPS);
        if idx == 0 {
            stepper = stepper
                .preamble(format!("Z motors: {}", z_motor.model))
                .kv("endstop_pin", "probe:z_virtual_endstop")
                .kv("position_max", geo.height)
                .kv("position_min", -5)
                .kv("homing_speed", 15)
                .kv("second_homing_speed", 3);
        }
        blocks.push(stepper);
        blocks.push(driver_block(
            name,
            DriverFamily::Tmc2209,
            &pins.driver,
            board.spi_bus(),
            &z_motor.current,
            true,
        ));
    }

    blocks.extend(leveling_blocks(leveling, geo));

    GeneratedSection::new(SectionKind::ZAxes, blocks)
}

fn point_lines<'a>(points: impl IntoIterator<Item = &'a crate::models::Point>) -> Vec<String> {
    points.into_iter().map(ToString::to_string).collect()
}

fn leveling_blocks(leveling: Leveling, geo: &BedGeometry) -> Vec<ConfigBlock> {
    match &geo.leveling {
        LevelingGeometry::QuadGantry { corners, points } => vec![ConfigBlock::new(
            leveling.section_name(),
        )
        .preamble(format!("Use {} to level the gantry", leveling.command()))
        .preamble(format!(
            "Gantry corners measured from the nozzle at (0, 0) and ({}, {})",
            geo.width, geo.depth
        ))
        .multiline("gantry_corners", point_lines(corners))
        .multiline("points", point_lines(points))
        .kv("speed", 100)
        .kv("horizontal_move_z", 10)
        .kv("retries", 5)
        .kv("retry_tolerance", "0.0075")
        .kv("max_adjust", 10)],
        LevelingGeometry::ZTilt {
            z_positions,
            points,
            bed_screws,
        } => {
            let tilt = ConfigBlock::new(leveling.section_name())
                .preamble(format!(
                    "Use {} to level the bed with three independent Z motors",
                    leveling.command()
                ))
                .multiline("z_positions", point_lines(z_positions))
                .multiline("points", point_lines(points))
                .kv("speed", 100)
                .kv("horizontal_move_z", 10)
                .kv("retries", 5)
                .kv("retry_tolerance", "0.0075");

            let names = ["Front Left", "Back Left", "Back Right", "Front Right"];
            let mut screws = ConfigBlock::new("bed_screws").preamble("Manual bed tramming");
            for (idx, (point, name)) in bed_screws.iter().zip(names).enumerate() {
                screws = screws
                    .kv(format!("screw{}", idx + 1), point)
                    .kv(format!("screw{}_name", idx + 1), name);
            }
            let screws = screws.kv("speed", 100).kv("screw_thread", "CW-M4");

            vec![tilt, screws]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::fixture;
    use crate::models::Category;

    #[test]
    fn test_spi_board_emits_tmc5160_blocks() {
        fixture(&[(Category::ControlBoard, "leviathan")], |sel, geo| {
            let section = xy_axes(sel, geo);
            for axis in ["x", "y"] {
                let driver = section.block(&format!("tmc5160 stepper_{axis}")).unwrap();
                assert_eq!(driver.get("spi_bus"), Some("spi4"));
                assert_eq!(driver.get("sense_resistor"), Some("0.075"));
                assert!(driver.get("uart_pin").is_none());
                assert_eq!(driver.get("interpolate"), Some("false"));
                assert_eq!(driver.get("stealthchop_threshold"), Some("0"));
            }
            assert_eq!(section.block("tmc5160 stepper_x").unwrap().get("cs_pin"), Some("PE15"));
            assert!(section.block("tmc2209 stepper_x").is_none());
        });
    }

    #[test]
    fn test_uart_board_emits_tmc2209_blocks() {
        fixture(&[(Category::ControlBoard, "octopus_pro")], |sel, geo| {
            let section = xy_axes(sel, geo);
            let driver = section.block("tmc2209 stepper_x").unwrap();
            assert_eq!(driver.get("uart_pin"), Some("PC4"));
            assert_eq!(driver.get("sense_resistor"), Some("0.110"));
            assert!(driver.get("spi_bus").is_none());
            assert!(section.block("tmc5160 stepper_y").is_none());
        });
    }

    #[test]
    fn test_xy_travel_and_inverted_enable() {
        fixture(&[(Category::BedSize, "350")], |sel, geo| {
            let section = xy_axes(sel, geo);
            let x = section.block("stepper_x").unwrap();
            assert_eq!(x.get("position_max"), Some("350"));
            assert_eq!(x.get("enable_pin"), Some("!PG0"));
            assert_eq!(x.get("run_current"), None);
        });
    }

    #[test]
    fn test_gantry_printer_gets_four_z_steppers() {
        fixture(&[(Category::Printer, "voron2.4")], |sel, geo| {
            let section = z_axes(sel, geo);
            let defines = section.defines();
            assert!(defines.contains(&"stepper_z3"));
            assert!(defines.contains(&"tmc2209 stepper_z3"));
            assert!(defines.contains(&"quad_gantry_level"));
            assert!(!defines.contains(&"z_tilt"));
            let qgl = section.block("quad_gantry_level").unwrap();
            assert_eq!(qgl.get_lines("gantry_corners").unwrap(), ["-60, -10", "360, 310"]);
            assert_eq!(qgl.get("max_adjust"), Some("10"));
        });
    }

    #[test]
    fn test_z_tilt_printer_gets_three_z_steppers_and_bed_screws() {
        fixture(&[(Category::Printer, "trident")], |sel, geo| {
            let section = z_axes(sel, geo);
            let defines = section.defines();
            assert!(!defines.contains(&"stepper_z3"));
            assert_eq!(defines.iter().filter(|h| h.starts_with("tmc2209 stepper_z")).count(), 3);
            assert!(defines.contains(&"z_tilt"));
            assert!(defines.contains(&"bed_screws"));
            let tilt = section.block("z_tilt").unwrap();
            assert_eq!(tilt.get_lines("points").unwrap().len(), 3);
            assert_eq!(tilt.get_lines("z_positions").unwrap()[1], "150, 350");
        });
    }

    #[test]
    fn test_motor_models_named_above_steppers() {
        fixture(&[], |sel, geo| {
            let mut out = String::new();
            xy_axes(sel, geo).render_into(&mut out);
            z_axes(sel, geo).render_into(&mut out);
            assert!(out.contains("## B stepper (X): 42STH48-2504AC\n[stepper_x]"));
            assert!(out.contains("## Z motors: 42STH48-2004AC\n[stepper_z]"));
        });
    }

    #[test]
    fn test_z_motors_share_one_current() {
        fixture(&[], |sel, geo| {
            let section = z_axes(sel, geo);
            let currents: Vec<_> = section
                .blocks
                .iter()
                .filter(|b| b.header().is_some_and(|h| h.starts_with("tmc2209 stepper_z")))
                .map(|b| b.get("run_current").unwrap())
                .collect();
            assert_eq!(currents, vec!["1.0"; 4]);
        });
    }
}
