//! Consistency checks over an assembled document.
//!
//! The generators should never produce a document that fails these checks;
//! the validator exists so callers (and tests) can confirm that a document
//! is internally consistent before writing it out.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

use crate::models::{ConfigurationDocument, Leveling};
use regex::Regex;
use std::collections::HashSet;

/// Leveling block headers, one per strategy.
const LEVELING_HEADERS: [(&str, Leveling); 2] = [
    ("quad_gantry_level", Leveling::QuadGantry),
    ("z_tilt", Leveling::ZTilt),
];

/// Validation result with specific errors and warnings.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Problems that make the document unusable
    pub errors: Vec<ValidationError>,
    /// Values the user must edit before the first start
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Formats the report as a user-friendly message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.errors.is_empty() {
            message.push_str(&format!("❌ {} validation errors:\n", self.errors.len()));
            for (idx, error) in self.errors.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            if !message.is_empty() {
                message.push('\n');
            }
            message.push_str(&format!("⚠️  {} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }
}

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Type of validation error
    pub kind: ValidationErrorKind,
    /// Block header the error refers to, if any
    pub section: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            section: None,
            message: message.into(),
        }
    }

    /// Sets the block the error refers to.
    #[must_use]
    pub fn in_section(mut self, header: impl Into<String>) -> Self {
        self.section = Some(header.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.section {
            Some(section) => write!(f, "[{section}] {}: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// No leveling block, or more than one
    LevelingCount,
    /// Z stepper count disagrees with the leveling strategy
    ZStepperCount,
    /// The same block header appears twice
    DuplicateSection,
    /// Bed mesh bounds outside the bed
    MeshOutOfBounds,
    /// A leveling probe point outside the bed
    ProbePointOutOfBounds,
    /// Sections out of document order
    SectionOrder,
    /// A required block is absent or unreadable
    MissingSection,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LevelingCount => write!(f, "Leveling Count"),
            Self::ZStepperCount => write!(f, "Z Stepper Count"),
            Self::DuplicateSection => write!(f, "Duplicate Section"),
            Self::MeshOutOfBounds => write!(f, "Mesh Out of Bounds"),
            Self::ProbePointOutOfBounds => write!(f, "Probe Point Out of Bounds"),
            Self::SectionOrder => write!(f, "Section Order"),
            Self::MissingSection => write!(f, "Missing Section"),
        }
    }
}

/// Validation warning (non-blocking).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning message
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new validation warning
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Document validator.
pub struct DocumentValidator<'a> {
    document: &'a ConfigurationDocument,
}

impl<'a> DocumentValidator<'a> {
    /// Creates a validator for a document.
    #[must_use]
    pub const fn new(document: &'a ConfigurationDocument) -> Self {
        Self { document }
    }

    /// Runs every check.
    ///
    /// Checks:
    /// - Exactly one leveling block
    /// - Z stepper count matches the leveling strategy
    /// - No duplicate block headers
    /// - Bed mesh bounds inside the bed
    /// - Leveling probe points on the bed
    /// - Sections in document order
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        self.validate_leveling(&mut report);
        self.validate_unique_headers(&mut report);
        self.validate_mesh_bounds(&mut report);
        self.validate_leveling_points(&mut report);
        self.validate_section_order(&mut report);
        self.check_placeholders(&mut report);

        report
    }

    fn validate_leveling(&self, report: &mut ValidationReport) {
        let present: Vec<(&str, Leveling)> = LEVELING_HEADERS
            .into_iter()
            .filter(|(header, _)| self.document.block(header).is_some())
            .collect();

        let [(header, leveling)] = present.as_slice() else {
            let found: Vec<&str> = present.iter().map(|(h, _)| *h).collect();
            report.add_error(ValidationError::new(
                ValidationErrorKind::LevelingCount,
                format!(
                    "expected exactly one leveling block, found {} ({})",
                    present.len(),
                    found.join(", ")
                ),
            ));
            return;
        };

        let z_steppers = self.document.count_blocks(is_z_stepper);
        if z_steppers != leveling.z_motor_count() {
            report.add_error(
                ValidationError::new(
                    ValidationErrorKind::ZStepperCount,
                    format!(
                        "{} needs {} Z steppers, found {z_steppers}",
                        leveling.command(),
                        leveling.z_motor_count()
                    ),
                )
                .in_section(*header),
            );
        }
    }

    fn validate_unique_headers(&self, report: &mut ValidationReport) {
        let mut seen = HashSet::new();
        for header in self.document.blocks().filter_map(|b| b.header()) {
            if !seen.insert(header) {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::DuplicateSection,
                        "block is defined more than once",
                    )
                    .in_section(header),
                );
            }
        }
    }

    /// Bed width and depth from the X and Y `position_max`.
    fn bed_extent(&self) -> Option<(f64, f64)> {
        let position_max = |header: &str| {
            self.document
                .block(header)
                .and_then(|b| b.get("position_max"))
                .and_then(|v| v.parse::<f64>().ok())
        };
        Some((position_max("stepper_x")?, position_max("stepper_y")?))
    }

    fn validate_mesh_bounds(&self, report: &mut ValidationReport) {
        let Some(mesh) = self.document.block("bed_mesh") else {
            report.add_error(ValidationError::new(
                ValidationErrorKind::MissingSection,
                "no [bed_mesh] block",
            ));
            return;
        };
        let Some((width, depth)) = self.bed_extent() else {
            report.add_error(ValidationError::new(
                ValidationErrorKind::MissingSection,
                "bed size unknown: [stepper_x]/[stepper_y] position_max missing",
            ));
            return;
        };

        let min = mesh.get("mesh_min").and_then(parse_point);
        let max = mesh.get("mesh_max").and_then(parse_point);
        let (Some(min), Some(max)) = (min, max) else {
            report.add_error(
                ValidationError::new(
                    ValidationErrorKind::MissingSection,
                    "mesh_min/mesh_max missing or unreadable",
                )
                .in_section("bed_mesh"),
            );
            return;
        };

        let inside = min.0 > 0.0
            && min.1 > 0.0
            && max.0 < width
            && max.1 < depth
            && min.0 < max.0
            && min.1 < max.1;
        if !inside {
            report.add_error(
                ValidationError::new(
                    ValidationErrorKind::MeshOutOfBounds,
                    format!(
                        "mesh ({}, {})-({}, {}) is not strictly inside the {width} x {depth} bed",
                        min.0, min.1, max.0, max.1
                    ),
                )
                .in_section("bed_mesh"),
            );
        }
    }

    fn validate_leveling_points(&self, report: &mut ValidationReport) {
        let Some((width, depth)) = self.bed_extent() else {
            return;
        };
        for (header, _) in LEVELING_HEADERS {
            let Some(lines) = self.document.block(header).and_then(|b| b.get_lines("points"))
            else {
                continue;
            };
            for line in lines {
                let on_bed = parse_point(line).is_some_and(|(x, y)| {
                    (0.0..=width).contains(&x) && (0.0..=depth).contains(&y)
                });
                if !on_bed {
                    report.add_error(
                        ValidationError::new(
                            ValidationErrorKind::ProbePointOutOfBounds,
                            format!(
                                "probe point '{}' is not on the {width} x {depth} bed",
                                line.trim()
                            ),
                        )
                        .in_section(header),
                    );
                }
            }
        }
    }

    fn validate_section_order(&self, report: &mut ValidationReport) {
        for pair in self.document.sections().windows(2) {
            if pair[0].kind >= pair[1].kind {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::SectionOrder,
                    format!("'{}' must not precede '{}'", pair[0].kind, pair[1].kind),
                ));
            }
        }
    }

    fn check_placeholders(&self, report: &mut ValidationReport) {
        let uuid = Regex::new(r"^[0-9a-f]{12}$").ok();
        for block in self.document.blocks() {
            let Some(header) = block.header() else { continue };

            if let Some(value) = block.get("canbus_uuid") {
                if !uuid.as_ref().is_some_and(|re| re.is_match(value)) {
                    report.add_warning(ValidationWarning::new(format!(
                        "[{header}] canbus_uuid '{value}' is a placeholder; \
                         run canbus_query.py and replace it"
                    )));
                }
            }

            if let Some(value) = block.get("serial") {
                if value.ends_with('_') {
                    report.add_warning(ValidationWarning::new(format!(
                        "[{header}] serial '{value}' is only a /dev/serial/by-id prefix; \
                         complete it with the device id"
                    )));
                }
            }
        }
    }
}

/// `stepper_z`, `stepper_z1`, ... but not `extruder_stepper` style names.
fn is_z_stepper(header: &str) -> bool {
    header
        .strip_prefix("stepper_z")
        .is_some_and(|n| n.is_empty() || n.parse::<u8>().is_ok())
}

fn parse_point(value: &str) -> Option<(f64, f64)> {
    let (x, y) = value.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigBlock, DocumentMetadata, GeneratedSection, SectionKind};

    fn metadata() -> DocumentMetadata {
        DocumentMetadata {
            printer_model: "Test".to_string(),
            bed_size: "300mm".to_string(),
            control_board: "Board".to_string(),
            toolhead_board: "Toolhead".to_string(),
            motor_kit: "Motors".to_string(),
            probe_type: "Probe".to_string(),
            macro_style: "Macros".to_string(),
            extruder_model: "Extruder".to_string(),
            generated_at: "1970-01-01T00:00:00+00:00".to_string(),
            catalog_version: "test".to_string(),
            defaulted: Vec::new(),
        }
    }

    fn axes(size: u32) -> GeneratedSection {
        GeneratedSection::new(
            SectionKind::XyAxes,
            vec![
                ConfigBlock::new("stepper_x").kv("position_max", size),
                ConfigBlock::new("stepper_y").kv("position_max", size),
            ],
        )
    }

    fn z_axes(count: usize, leveling: &str) -> GeneratedSection {
        let mut blocks: Vec<ConfigBlock> =
            ["stepper_z", "stepper_z1", "stepper_z2", "stepper_z3"]
                .into_iter()
                .take(count)
                .map(ConfigBlock::new)
                .collect();
        blocks.push(ConfigBlock::new(leveling));
        GeneratedSection::new(SectionKind::ZAxes, blocks)
    }

    fn mesh(min: &str, max: &str) -> GeneratedSection {
        GeneratedSection::new(
            SectionKind::Probe,
            vec![ConfigBlock::new("bed_mesh").kv("mesh_min", min).kv("mesh_max", max)],
        )
    }

    fn document(sections: Vec<GeneratedSection>) -> ConfigurationDocument {
        ConfigurationDocument::from_ordered(sections, metadata())
    }

    #[test]
    fn test_consistent_document_is_valid() {
        let doc = document(vec![
            axes(300),
            z_axes(4, "quad_gantry_level"),
            mesh("40, 40", "260, 260"),
        ]);
        let report = DocumentValidator::new(&doc).validate();
        assert!(report.is_valid(), "{}", report.format_message());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_z_count_must_match_leveling() {
        let doc = document(vec![axes(300), z_axes(4, "z_tilt"), mesh("40, 40", "260, 260")]);
        let report = DocumentValidator::new(&doc).validate();
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::ZStepperCount));
    }

    #[test]
    fn test_two_leveling_blocks_rejected() {
        let mut z = z_axes(4, "quad_gantry_level");
        z.blocks.push(ConfigBlock::new("z_tilt"));
        let doc = document(vec![axes(300), z, mesh("40, 40", "260, 260")]);
        let report = DocumentValidator::new(&doc).validate();
        assert_eq!(report.errors[0].kind, ValidationErrorKind::LevelingCount);
    }

    #[test]
    fn test_mesh_touching_bed_edge_rejected() {
        let doc = document(vec![axes(300), z_axes(3, "z_tilt"), mesh("0, 40", "260, 260")]);
        let report = DocumentValidator::new(&doc).validate();
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MeshOutOfBounds));
    }

    #[test]
    fn test_leveling_point_beyond_bed_depth_rejected() {
        let mut z = z_axes(4, "quad_gantry_level");
        z.blocks.pop();
        z.blocks.push(ConfigBlock::new("quad_gantry_level").multiline(
            "points",
            ["50, 25", "50, 255", "255, 255", "255, 25"],
        ));
        let x = ConfigBlock::new("stepper_x").kv("position_max", 300);
        let y = ConfigBlock::new("stepper_y").kv("position_max", 250);
        let axes = GeneratedSection::new(SectionKind::XyAxes, vec![x, y]);
        let doc = document(vec![axes, z, mesh("40, 40", "210, 210")]);

        let report = DocumentValidator::new(&doc).validate();
        let out_of_bounds: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::ProbePointOutOfBounds)
            .collect();
        assert_eq!(out_of_bounds.len(), 2);
        assert_eq!(out_of_bounds[0].section.as_deref(), Some("quad_gantry_level"));
        assert!(out_of_bounds[0].message.contains("50, 255"));
    }

    #[test]
    fn test_duplicate_headers_and_order() {
        let doc = document(vec![
            z_axes(3, "z_tilt"),
            axes(300),
            mesh("40, 40", "260, 260"),
            mesh("40, 40", "260, 260"),
        ]);
        let report = DocumentValidator::new(&doc).validate();
        let kinds: Vec<_> = report.errors.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&ValidationErrorKind::DuplicateSection));
        assert!(kinds.contains(&ValidationErrorKind::SectionOrder));
    }

    #[test]
    fn test_placeholder_warnings() {
        let mcu = GeneratedSection::new(
            SectionKind::Mcu,
            vec![
                ConfigBlock::new("mcu").kv("serial", "/dev/serial/by-id/usb-Klipper_stm32f446xx_"),
                ConfigBlock::new("mcu toolhead").kv("canbus_uuid", "ebb36"),
            ],
        );
        let doc = document(vec![
            mcu,
            axes(300),
            z_axes(3, "z_tilt"),
            mesh("40, 40", "260, 260"),
        ]);
        let report = DocumentValidator::new(&doc).validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
        assert!(report.format_message().contains("2 warnings"));

        let real = GeneratedSection::new(
            SectionKind::Mcu,
            vec![ConfigBlock::new("mcu toolhead").kv("canbus_uuid", "0e0d81e4210c")],
        );
        let doc = document(vec![
            real,
            axes(300),
            z_axes(3, "z_tilt"),
            mesh("40, 40", "260, 260"),
        ]);
        assert!(DocumentValidator::new(&doc).validate().warnings.is_empty());
    }
}
