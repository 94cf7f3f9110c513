//! Resolves raw selection keys against the catalog.

use crate::catalog::{Catalog, CatalogEntry, Registry};
use crate::models::{Category, RawSelection, Resolution, ResolvedSelection};

/// Resolves every category of `raw` to a catalog entry.
///
/// Known keys resolve to their entry. Missing or unknown keys fall back to
/// the category default; the fallback is recorded as
/// [`Resolution::Defaulted`] and logged, never returned as an error.
#[must_use]
pub fn resolve<'r>(registry: &'r Registry, raw: &RawSelection) -> ResolvedSelection<'r> {
    ResolvedSelection {
        printer: resolve_one(&registry.printers, Category::Printer, raw),
        bed_size: resolve_one(&registry.bed_sizes, Category::BedSize, raw),
        control_board: resolve_one(&registry.control_boards, Category::ControlBoard, raw),
        toolhead_board: resolve_one(&registry.toolhead_boards, Category::ToolheadBoard, raw),
        motor_kit: resolve_one(&registry.motor_kits, Category::MotorKit, raw),
        extruder: resolve_one(&registry.extruders, Category::Extruder, raw),
        probe: resolve_one(&registry.probes, Category::Probe, raw),
        macro_style: resolve_one(&registry.macro_styles, Category::MacroStyle, raw),
    }
}

fn resolve_one<'r, T: CatalogEntry>(
    catalog: &'r Catalog<T>,
    category: Category,
    raw: &RawSelection,
) -> Resolution<'r, T> {
    let requested = raw.get(category);
    if let Some(entry) = requested.and_then(|key| catalog.get(key)) {
        return Resolution::Resolved(entry);
    }

    let entry = catalog.default_entry();
    match requested {
        Some(key) => tracing::debug!(
            "Unknown {} '{}', using default '{}'",
            category,
            key,
            entry.key()
        ),
        None => tracing::debug!("No {} selected, using default '{}'", category, entry.key()),
    }

    Resolution::Defaulted {
        requested: requested.map(str::to_string),
        entry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::load().unwrap()
    }

    #[test]
    fn test_known_keys_resolve() {
        let registry = registry();
        let raw = RawSelection::new()
            .with(Category::Printer, "trident")
            .with(Category::BedSize, "350")
            .with(Category::ControlBoard, "octopus_pro")
            .with(Category::ToolheadBoard, "ebb36")
            .with(Category::Probe, "beacon")
            .with(Category::MacroStyle, "better")
            .with(Category::Extruder, "bondtech_lgx_lite");

        let resolved = resolve(&registry, &raw);

        assert_eq!(resolved.printer().id, "trident");
        assert_eq!(resolved.bed_size().id, "350");
        assert_eq!(resolved.board().id, "octopus_pro");
        assert_eq!(resolved.toolhead().id, "ebb36");
        assert_eq!(resolved.probe().id, "beacon");
        assert_eq!(resolved.macro_style().id, "better");
        assert_eq!(resolved.extruder().id, "bondtech_lgx_lite");
        // Motor kit was not supplied
        assert_eq!(resolved.defaulted(), vec![(Category::MotorKit, None)]);
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        let registry = registry();
        let raw = RawSelection::new().with(Category::ControlBoard, "skr_pico");

        let resolved = resolve(&registry, &raw);

        assert_eq!(resolved.board().key(), "leviathan");
        assert!(resolved.control_board.is_defaulted());
        assert_eq!(resolved.control_board.requested(), Some("skr_pico"));
    }

    #[test]
    fn test_empty_selection_uses_every_default() {
        let registry = registry();
        let resolved = resolve(&registry, &RawSelection::new());

        assert_eq!(resolved.defaulted().len(), Category::ALL.len());
        for category in Category::ALL {
            let label = resolved.labels()[&category];
            let expected = registry
                .lookup(category, registry.default_key(category))
                .unwrap()
                .name();
            assert_eq!(label, expected);
        }
    }

    #[test]
    fn test_switch_probe_request_defaults_to_tap() {
        let registry = registry();
        let raw = RawSelection::new().with(Category::Probe, "switch");
        let resolved = resolve(&registry, &raw);
        assert_eq!(resolved.probe().id, "tap");
        assert!(resolved.probe.is_defaulted());
    }
}
