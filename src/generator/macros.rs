//! G-code macros.
//!
//! The printer-specific macros are a product of two axes: leveling strategy
//! (gantry or Z tilt) and macro flavor (minimal or enhanced). Every
//! combination defines the same macro names; only the bodies differ.
//! Coordinates embedded in macro bodies come from [`BedGeometry`].

use crate::models::{
    BedGeometry, ConfigBlock, GeneratedSection, Leveling, MacroFlavor, ResolvedSelection,
    SectionKind,
};

/// Macro names every combination emits.
pub const REQUIRED_MACROS: [&str; 6] = [
    "G32",
    "PRINT_START",
    "PRINT_END",
    "M600",
    "LOAD_FILAMENT",
    "UNLOAD_FILAMENT",
];

const PRIME_LINE: [&str; 6] = [
    "G1 X20 Y20 F3000",
    "G1 Z0.2 F3000",
    "G1 X50 Y20 E15 F1500",
    "G1 X80 Y20 E15 F1500",
    "G1 X100 Y20 E10 F1500",
    "G1 Z2 F3000",
];

fn body<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines.iter().map(|l| l.as_ref().to_string()).collect()
}

fn gcode_macro(name: &str, description: &str, gcode: Vec<String>) -> ConfigBlock {
    ConfigBlock::new(format!("gcode_macro {name}"))
        .kv("description", description)
        .multiline("gcode", gcode)
}

fn renamed_macro(name: &str, gcode: &[&str]) -> ConfigBlock {
    ConfigBlock::new(format!("gcode_macro {name}"))
        .kv("rename_existing", format!("{name}.0"))
        .multiline("gcode", body(gcode))
}

/// Wrappers around built-in commands, identical for every printer.
fn common_macros() -> Vec<ConfigBlock> {
    vec![
        renamed_macro("G28", &["G28.0 {rawparams}"]),
        renamed_macro("M109", &["M109.0 {rawparams}"]),
        renamed_macro("M190", &["M190.0 {rawparams}"]),
        renamed_macro(
            "CANCEL_PRINT",
            &[
                "G91",
                "G1 Z5 E-5 F3000",
                "G90",
                "TURN_OFF_HEATERS",
                "M84",
                "CANCEL_PRINT.0",
            ],
        ),
        renamed_macro(
            "PAUSE",
            &["PAUSE.0", "G91", "G1 E-5 F3000", "G1 Z10 F3000", "G90"],
        ),
        renamed_macro(
            "RESUME",
            &["G91", "G1 E5 F3000", "G90", "RESUME.0"],
        ),
    ]
}

fn leveling_macro(leveling: Leveling) -> ConfigBlock {
    gcode_macro(
        "G32",
        leveling.label(),
        body(&["BED_MESH_CLEAR", leveling.command(), "G28"]),
    )
}

fn print_start_minimal(leveling: Leveling) -> ConfigBlock {
    let mut gcode = body(&[
        "{% set BED_TEMP = params.BED|default(60)|float %}",
        "{% set EXTRUDER_TEMP = params.EXTRUDER|default(200)|float %}",
        "G28",
        leveling.command(),
        "G28 Z",
        "M190 S{BED_TEMP}",
        "M109 S{EXTRUDER_TEMP}",
        "BED_MESH_PROFILE LOAD=default",
    ]);
    gcode.extend(body(&PRIME_LINE));
    gcode_macro("PRINT_START", "Standard print start sequence", gcode)
}

fn print_start_enhanced(leveling: Leveling, geo: &BedGeometry) -> ConfigBlock {
    let center = geo.center;
    let mut gcode = body(&[
        "# Parameters",
        "{% set BED_TEMP = params.BED|default(60)|float %}",
        "{% set EXTRUDER_TEMP = params.EXTRUDER|default(200)|float %}",
        "{% set CHAMBER_TEMP = params.CHAMBER|default(0)|float %}",
        "{% set SOAK_TIME = params.SOAK|default(0)|int %}",
        "{% set ADAPTIVE_MESH = params.MESH|default(1)|int %}",
        "",
        "M104 S150",
        "M140 S{BED_TEMP}",
        "G28",
        leveling.command(),
        "G28 Z",
        "",
        "# Park at center for chamber heating",
    ]);
    gcode.push(format!("G1 X{} Y{} F3000", center.x, center.y));
    gcode.extend(body(&[
        "G1 Z50 F3000",
        "",
        "{% if CHAMBER_TEMP > 0 %}",
        "    M190 S{BED_TEMP}",
        "    {% if SOAK_TIME > 0 %}",
        "        G4 P{SOAK_TIME * 60000}",
        "    {% endif %}",
        "{% else %}",
        "    M190 S{BED_TEMP}",
        "{% endif %}",
        "",
        "{% if ADAPTIVE_MESH > 0 %}",
        "    BED_MESH_CALIBRATE",
        "{% else %}",
        "    BED_MESH_PROFILE LOAD=default",
        "{% endif %}",
        "",
        "M109 S{EXTRUDER_TEMP}",
    ]));
    gcode.extend(body(&PRIME_LINE));
    gcode_macro(
        "PRINT_START",
        "Enhanced print start with heat soak and adaptive bed mesh",
        gcode,
    )
}

fn print_end(flavor: MacroFlavor, geo: &BedGeometry) -> ConfigBlock {
    let park = format!("G1 X{} Y{} F3000", geo.print_end_park.x, geo.print_end_park.y);
    match flavor {
        MacroFlavor::Minimal => gcode_macro(
            "PRINT_END",
            "End print sequence",
            body(&[
                "G91",
                "G1 E-5 F3000",
                "G1 Z10 F3000",
                "G90",
                park.as_str(),
                "TURN_OFF_HEATERS",
                "M84",
            ]),
        ),
        MacroFlavor::Enhanced => gcode_macro(
            "PRINT_END",
            "Enhanced print end with part cooling",
            body(&[
                "G91",
                "G1 E-3 F3000",
                "G1 Z10 F3000",
                "G90",
                park.as_str(),
                "M104 S0",
                "M140 S0",
                "M106 S255",
                "G4 P30000",
                "M106 S0",
                "M84",
            ]),
        ),
    }
}

fn filament_macros(geo: &BedGeometry) -> Vec<ConfigBlock> {
    let park = format!("G1 X{} Y{} F3000", geo.filament_park.x, geo.filament_park.y);
    vec![
        gcode_macro(
            "M600",
            "Filament change with parking",
            body(&[
                "PAUSE",
                "G91",
                "G1 E-20 F3000",
                "G1 Z50 F3000",
                "G90",
                park.as_str(),
                "M109 S200",
            ]),
        ),
        gcode_macro(
            "LOAD_FILAMENT",
            "Load filament with purge",
            body(&["M109 S200", "G91", "G1 E50 F300", "G1 E10 F150", "G90"]),
        ),
        gcode_macro(
            "UNLOAD_FILAMENT",
            "Unload filament",
            body(&["M109 S200", "G91", "G1 E10 F150", "G1 E-60 F3000", "G90"]),
        ),
    ]
}

/// Common wrappers followed by the printer- and flavor-specific macros.
#[must_use]
pub fn macros(sel: &ResolvedSelection<'_>, geo: &BedGeometry) -> GeneratedSection {
    let leveling = sel.printer().leveling;
    let flavor = sel.macro_style().flavor;

    let mut blocks = common_macros();
    blocks.push(
        leveling_macro(leveling)
            .preamble(format!("{} macros ({})", sel.printer().name, sel.macro_style().name)),
    );
    blocks.push(match flavor {
        MacroFlavor::Minimal => print_start_minimal(leveling),
        MacroFlavor::Enhanced => print_start_enhanced(leveling, geo),
    });
    blocks.push(print_end(flavor, geo));
    blocks.extend(filament_macros(geo));

    GeneratedSection::new(SectionKind::Macros, blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::fixture;
    use crate::models::Category;

    #[test]
    fn test_every_combination_defines_required_macros() {
        for printer in ["voron2.4", "trident"] {
            for style in ["standard", "better"] {
                fixture(
                    &[(Category::Printer, printer), (Category::MacroStyle, style)],
                    |sel, geo| {
                        let section = macros(sel, geo);
                        for name in REQUIRED_MACROS {
                            let header = format!("gcode_macro {name}");
                            assert!(
                                section.block(&header).is_some(),
                                "{printer}/{style} missing {name}"
                            );
                        }
                        for name in ["G28", "M109", "M190", "CANCEL_PRINT", "PAUSE", "RESUME"] {
                            assert!(section.block(&format!("gcode_macro {name}")).is_some());
                        }
                    },
                );
            }
        }
    }

    #[test]
    fn test_leveling_macro_matches_kinematics() {
        fixture(&[(Category::Printer, "trident")], |sel, geo| {
            let section = macros(sel, geo);
            let g32 = section.block("gcode_macro G32").unwrap();
            assert!(g32.mentions("Z_TILT_ADJUST"));
            assert!(!g32.mentions("QUAD_GANTRY_LEVEL"));
        });
    }

    #[test]
    fn test_enhanced_start_adds_soak_and_adaptive_mesh() {
        fixture(&[(Category::MacroStyle, "better")], |sel, geo| {
            let section = macros(sel, geo);
            let start = section.block("gcode_macro PRINT_START").unwrap();
            assert!(start.mentions("CHAMBER_TEMP"));
            assert!(start.mentions("BED_MESH_CALIBRATE"));
            assert!(start.mentions("G1 X150 Y150 F3000"));
        });
        fixture(&[(Category::MacroStyle, "standard")], |sel, geo| {
            let section = macros(sel, geo);
            let start = section.block("gcode_macro PRINT_START").unwrap();
            assert!(!start.mentions("CHAMBER_TEMP"));
            assert!(start.mentions("BED_MESH_PROFILE LOAD=default"));
        });
    }

    #[test]
    fn test_park_positions_come_from_geometry() {
        fixture(&[(Category::Printer, "voron2.4"), (Category::BedSize, "350")], |sel, geo| {
            let section = macros(sel, geo);
            let end = section.block("gcode_macro PRINT_END").unwrap();
            assert!(end.mentions("G1 X175 Y300 F3000"));
            let m600 = section.block("gcode_macro M600").unwrap();
            assert!(m600.mentions("G1 X175 Y20 F3000"));
        });
        fixture(&[(Category::Printer, "trident"), (Category::BedSize, "300")], |sel, geo| {
            let section = macros(sel, geo);
            let end = section.block("gcode_macro PRINT_END").unwrap();
            assert!(end.mentions("G1 X150 Y30 F3000"));
        });
    }
}
