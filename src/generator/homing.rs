//! Homing and idle timeout.

use crate::models::{BedGeometry, ConfigBlock, GeneratedSection, ResolvedSelection, SectionKind};

/// `[idle_timeout]`, plus `[safe_z_home]` at the bed center unless the probe
/// performs Z homing itself.
#[must_use]
pub fn homing(sel: &ResolvedSelection<'_>, geo: &BedGeometry) -> GeneratedSection {
    let mut blocks = vec![ConfigBlock::new("idle_timeout").kv("timeout", 1800)];

    if sel.probe().owns_homing() {
        tracing::debug!("{} homes Z itself, skipping safe_z_home", sel.probe().name);
    } else {
        blocks.push(
            ConfigBlock::new("safe_z_home")
                .kv("home_xy_position", geo.center)
                .kv("speed", 100)
                .kv("z_hop", 10)
                .kv("z_hop_speed", 15),
        );
    }

    GeneratedSection::new(SectionKind::Homing, blocks)
}
