//! printer.cfg generation.
//!
//! Each submodule turns a [`ResolvedSelection`] and its [`BedGeometry`] into
//! one or more [`GeneratedSection`]s. The assembler orders them and the
//! validator checks the finished document for internal consistency.

pub mod assembler;
pub mod board;
pub mod homing;
pub mod macros;
pub mod probe;
pub mod steppers;
pub mod thermal;
pub mod toolhead;
pub mod validator;

use crate::models::{BedGeometry, GeneratedSection, ResolvedSelection};

// Re-export generator types
pub use assembler::assemble;
pub use macros::REQUIRED_MACROS;
pub use validator::{DocumentValidator, ValidationReport};

/// Runs every section generator.
///
/// Sections come back in generator order; appendices are only present when
/// the toolhead has an accelerometer or a CAN connection.
#[must_use]
pub fn generate_sections(sel: &ResolvedSelection<'_>, geo: &BedGeometry) -> Vec<GeneratedSection> {
    let mut sections = vec![
        board::mcu(sel),
        board::kinematics(sel, geo),
        steppers::xy_axes(sel, geo),
        steppers::z_axes(sel, geo),
        toolhead::extruder(sel),
        thermal::bed_heater(sel),
        probe::probe_and_mesh(sel, geo),
        thermal::fans_and_sensors(sel),
        homing::homing(sel, geo),
        macros::macros(sel, geo),
    ];
    sections.extend(toolhead::accelerometer(sel, geo));
    sections.extend(toolhead::can_notes(sel));
    sections
}
