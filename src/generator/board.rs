//! MCU declarations and global kinematics.

use super::toolhead;
use crate::models::{BedGeometry, ConfigBlock, GeneratedSection, ResolvedSelection, SectionKind};

/// `[mcu]` for the main board followed by `[mcu toolhead]`.
#[must_use]
pub fn mcu(sel: &ResolvedSelection<'_>) -> GeneratedSection {
    let board = sel.board();

    let main = ConfigBlock::new("mcu")
        .preamble(format!(
            "{} ({}) - obtain the path with \"ls -l /dev/serial/by-id/\"",
            board.name,
            board.mcu.to_uppercase()
        ))
        .kv("serial", &board.serial_port)
        .kv("restart_method", "command");

    GeneratedSection::new(SectionKind::Mcu, vec![main, toolhead::mcu_block(sel)])
}

/// `[printer]` with CoreXY kinematics and the model's motion limits.
#[must_use]
pub fn kinematics(sel: &ResolvedSelection<'_>, geo: &BedGeometry) -> GeneratedSection {
    let printer = sel.printer();
    let limits = &printer.limits;

    let block = ConfigBlock::new("printer")
        .preamble(format!("{} {}", printer.name, sel.bed_size().name))
        .kv("kinematics", "corexy")
        .kv("max_velocity", limits.max_velocity)
        .kv("max_accel", limits.max_accel)
        .kv("max_z_velocity", limits.max_z_velocity)
        .kv("max_z_accel", limits.max_z_accel)
        .kv("square_corner_velocity", format!("{:.1}", limits.square_corner_velocity))
        .comment(format!(
            "Build volume {} x {} x {} mm",
            geo.width, geo.depth, geo.height
        ));

    GeneratedSection::new(SectionKind::Kinematics, vec![block])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::fixture;

    #[test]
    fn test_mcu_section_declares_both_mcus() {
        fixture(&[], |sel, _| {
            let section = mcu(sel);
            assert_eq!(section.defines(), vec!["mcu", "mcu toolhead"]);
            let main = section.block("mcu").unwrap();
            assert_eq!(main.get("serial"), Some("/dev/serial/by-id/usb-Klipper_stm32f446xx_"));
            assert_eq!(main.get("restart_method"), Some("command"));
        });
    }

    #[test]
    fn test_printer_block_carries_limits() {
        fixture(&[], |sel, geo| {
            let section = kinematics(sel, geo);
            let printer = section.block("printer").unwrap();
            assert_eq!(printer.get("kinematics"), Some("corexy"));
            assert_eq!(printer.get("max_accel"), Some("10000"));
            assert_eq!(printer.get("square_corner_velocity"), Some("5.0"));
        });
    }
}
