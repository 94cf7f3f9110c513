//! End-to-end compilation: raw selection in, document out.

use crate::catalog::Registry;
use crate::constants::DEFAULT_FILENAME;
use crate::generator::{assemble, generate_sections};
use crate::models::{
    Category, ConfigurationDocument, DocumentMetadata, RawSelection, ResolvedSelection,
};
use crate::services::{geometry, resolver};
use serde::{Deserialize, Serialize};

/// Compiles a selection into a complete configuration document.
///
/// Never fails: unknown or missing keys resolve to catalog defaults and are
/// listed in [`DocumentMetadata::defaulted`].
#[must_use]
pub fn compile(registry: &Registry, raw: &RawSelection) -> ConfigurationDocument {
    let sel = resolver::resolve(registry, raw);
    let geo = geometry::derive(sel.printer(), sel.bed_size());
    let sections = generate_sections(&sel, &geo);
    let metadata = build_metadata(registry, &sel);

    let document = assemble(sections, metadata);
    tracing::info!(
        "Compiled {} {} with {} / {} ({} sections, {} defaulted)",
        sel.printer().name,
        sel.bed_size().name,
        sel.board().name,
        sel.toolhead().name,
        document.sections().len(),
        document.metadata().defaulted.len()
    );
    document
}

fn build_metadata(registry: &Registry, sel: &ResolvedSelection<'_>) -> DocumentMetadata {
    let labels = sel.labels();
    let label = |category: Category| labels.get(&category).copied().unwrap_or_default().to_string();

    DocumentMetadata {
        printer_model: label(Category::Printer),
        bed_size: label(Category::BedSize),
        control_board: label(Category::ControlBoard),
        toolhead_board: label(Category::ToolheadBoard),
        motor_kit: label(Category::MotorKit),
        probe_type: label(Category::Probe),
        macro_style: label(Category::MacroStyle),
        extruder_model: label(Category::Extruder),
        generated_at: chrono::Utc::now().to_rfc3339(),
        catalog_version: registry.version().to_string(),
        defaulted: sel
            .defaulted()
            .into_iter()
            .map(|(category, requested)| match requested {
                Some(key) => format!("{}: '{key}'", category.as_str()),
                None => category.as_str().to_string(),
            })
            .collect(),
    }
}

/// Result of a generation request, shared by the CLI `--json` output and
/// the web API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Always true; generation does not fail on user input
    pub success: bool,
    /// Rendered printer.cfg text
    pub config: String,
    /// Suggested file name
    pub filename: String,
    /// What the document was generated from
    pub metadata: DocumentMetadata,
}

impl GenerationResponse {
    /// Renders a document into a response with the default file name.
    #[must_use]
    pub fn from_document(document: &ConfigurationDocument) -> Self {
        Self::with_filename(document, DEFAULT_FILENAME)
    }

    /// Renders a document into a response with a custom file name.
    #[must_use]
    pub fn with_filename(document: &ConfigurationDocument, filename: impl Into<String>) -> Self {
        Self {
            success: true,
            config: document.render(),
            filename: filename.into(),
            metadata: document.metadata().clone(),
        }
    }
}
