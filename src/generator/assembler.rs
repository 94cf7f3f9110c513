//! Orders generated sections into a document.

use crate::models::{ConfigurationDocument, DocumentMetadata, GeneratedSection};

/// Sorts sections into document order and wraps them with metadata.
///
/// The sort is stable, so blocks of sections sharing a kind keep the order
/// their generators produced them in.
#[must_use]
pub fn assemble(
    mut sections: Vec<GeneratedSection>,
    metadata: DocumentMetadata,
) -> ConfigurationDocument {
    sections.sort_by_key(|s| s.kind);
    ConfigurationDocument::from_ordered(sections, metadata)
}
