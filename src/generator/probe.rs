//! Probe and bed mesh generator.

use super::toolhead::TOOLHEAD_MCU;
use crate::models::{
    BedGeometry, ConfigBlock, GeneratedSection, PinSource, ProbeKind, ResolvedSelection,
    SectionKind,
};

/// Probe block for the selected probe type followed by the shared `[bed_mesh]`.
#[must_use]
pub fn probe_and_mesh(sel: &ResolvedSelection<'_>, geo: &BedGeometry) -> GeneratedSection {
    let probe = sel.probe();

    let blocks = match &probe.kind {
        ProbeKind::Switch {
            pin_source,
            pull_up,
        } => {
            let raw = match pin_source {
                PinSource::Toolhead => &sel.toolhead().probe_pin,
                PinSource::Board => &sel.board().probe_pin,
            };
            let pin = if *pull_up { raw.pulled_up() } else { raw.clone() };
            let pin = match pin_source {
                PinSource::Toolhead => pin.on_chip(TOOLHEAD_MCU),
                PinSource::Board => pin.to_string(),
            };

            let probe_block = ConfigBlock::new("probe")
                .preamble(probe.name.clone())
                .kv("pin", pin)
                .kv("x_offset", "0.0")
                .kv("y_offset", "0.0")
                .comment("z_offset: calibrate with PROBE_CALIBRATE")
                .kv("speed", "3.0")
                .kv("lift_speed", "5.0")
                .kv("samples", 3)
                .kv("samples_result", "median")
                .kv("sample_retract_dist", "3.0")
                .kv("samples_tolerance", "0.006")
                .kv("samples_tolerance_retries", 3);

            let calibrate = ConfigBlock::new("gcode_macro PROBE_CALIBRATE")
                .kv("description", "Calibrate probe z_offset")
                .kv("rename_existing", "PROBE_CALIBRATE.0")
                .multiline("gcode", ["PROBE_CALIBRATE.0 {rawparams}"]);

            vec![probe_block, mesh_block(geo), calibrate]
        }
        ProbeKind::Beacon { serial_port } => {
            let beacon = ConfigBlock::new("beacon")
                .preamble(format!("{} - owns Z homing", probe.name))
                .kv("serial", serial_port)
                .kv("x_offset", 0)
                .kv("y_offset", 20)
                .kv("mesh_main_direction", "x")
                .kv("mesh_runs", 2)
                .kv("contact_max_hotend_temperature", 180)
                .kv("home_xy_position", geo.center)
                .kv("home_z_hop", 5)
                .kv("home_z_hop_speed", 30)
                .kv("home_xy_move_speed", 300)
                .kv("home_method", "contact")
                .kv("home_method_when_homed", "proximity")
                .kv("home_autocalibrate", "unhomed");

            let calibrate = ConfigBlock::new("gcode_macro PROBE_CALIBRATE")
                .kv("description", "Calibrate Beacon contact offset")
                .multiline("gcode", ["BEACON_AUTO_CALIBRATE"]);

            vec![beacon, mesh_block(geo), calibrate]
        }
    };

    GeneratedSection::new(SectionKind::Probe, blocks)
}

/// `[bed_mesh]` depends only on bed geometry so every probe type agrees.
fn mesh_block(geo: &BedGeometry) -> ConfigBlock {
    let (cols, rows) = geo.mesh.probe_count;
    ConfigBlock::new("bed_mesh")
        .kv("speed", 300)
        .kv("horizontal_move_z", 10)
        .kv("mesh_min", geo.mesh.min)
        .kv("mesh_max", geo.mesh.max)
        .kv("fade_start", "0.6")
        .kv("fade_end", "10.0")
        .kv("probe_count", format!("{cols}, {rows}"))
        .comment("Odd counts put one point at the bed center")
        .kv("algorithm", "bicubic")
        .kv("zero_reference_position", geo.center)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::fixture;
    use crate::models::Category;

    #[test]
    fn test_tap_probe_pin_is_pulled_up_on_toolhead() {
        fixture(&[(Category::Probe, "tap")], |sel, geo| {
            let section = probe_and_mesh(sel, geo);
            let probe = section.block("probe").unwrap();
            assert_eq!(probe.get("pin"), Some("^toolhead:gpio10"));
            assert_eq!(probe.get("samples"), Some("3"));
            assert_eq!(probe.get("samples_result"), Some("median"));
            assert_eq!(probe.get("samples_tolerance"), Some("0.006"));
            assert!(section.block("beacon").is_none());
        });
    }

    #[test]
    fn test_beacon_emits_serial_module() {
        fixture(&[(Category::Probe, "beacon")], |sel, geo| {
            let section = probe_and_mesh(sel, geo);
            let beacon = section.block("beacon").unwrap();
            assert!(beacon.get("serial").unwrap().starts_with("/dev/serial/by-id/usb-Beacon"));
            assert_eq!(beacon.get("home_xy_position"), Some("150, 150"));
            assert!(section.block("probe").is_none());
        });
    }

    #[test]
    fn test_mesh_identical_across_probe_types() {
        let mut meshes = Vec::new();
        for probe in ["tap", "beacon"] {
            fixture(&[(Category::Probe, probe), (Category::BedSize, "250")], |sel, geo| {
                let section = probe_and_mesh(sel, geo);
                meshes.push(section.block("bed_mesh").unwrap().clone());
            });
        }
        assert_eq!(meshes[0], meshes[1]);
        assert_eq!(meshes[0].get("mesh_min"), Some("40, 40"));
        assert_eq!(meshes[0].get("mesh_max"), Some("210, 210"));
        assert_eq!(meshes[0].get("probe_count"), Some("7, 7"));
    }
}
