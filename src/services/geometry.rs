//! Bed geometry derivation.
//!
//! Gantry-leveling coordinates come from a literal table of machine-verified
//! values; Z-tilt coordinates and everything else follow fixed offsets from
//! the bed bounds.

use crate::models::{
    BedGeometry, BedSize, Leveling, LevelingGeometry, MeshBounds, Point, Point3, PrinterModel,
};

/// Inset of the bed mesh from every bed edge.
pub const MESH_MARGIN: f64 = 40.0;

/// Bed mesh probe grid density, independent of bed size.
pub const MESH_PROBE_COUNT: (u32, u32) = (7, 7);

/// Z-tilt probe point inset from the front corners and rear edge.
const Z_TILT_PROBE_INSET: f64 = 30.0;

/// Bed screw inset from each bed corner.
const BED_SCREW_INSET: f64 = 30.0;

/// Height of the resonance measurement point.
const RESONANCE_Z: f64 = 20.0;

/// Gantry corner and probe point nearest the origin, shared by every bed.
const GANTRY_NEAR_CORNER: Point = Point::new(-60.0, -10.0);
const GANTRY_NEAR_POINT: Point = Point::new(50.0, 25.0);

/// Far-side gantry coordinates along one axis for a supported bed length.
///
/// The table is separable per axis, so a bed picks its X values from the row
/// nearest its width and its Y values from the row nearest its depth.
struct GantryRow {
    bed: f64,
    far_corner: (f64, f64),
    far_point: (f64, f64),
}

static GANTRY_TABLE: [GantryRow; 3] = [
    GantryRow {
        bed: 250.0,
        far_corner: (310.0, 260.0),
        far_point: (200.0, 175.0),
    },
    GantryRow {
        bed: 300.0,
        far_corner: (360.0, 310.0),
        far_point: (255.0, 255.0),
    },
    GantryRow {
        bed: 350.0,
        far_corner: (410.0, 360.0),
        far_point: (300.0, 300.0),
    },
];

/// Derives all bed-dependent coordinates for a printer and bed size.
#[must_use]
pub fn derive(printer: &PrinterModel, bed: &BedSize) -> BedGeometry {
    let (w, d) = (bed.width, bed.depth);

    let leveling = match printer.leveling {
        Leveling::QuadGantry => gantry_leveling(w, d),
        Leveling::ZTilt => z_tilt_leveling(w, d),
    };

    let print_end_park = match printer.leveling {
        Leveling::QuadGantry => Point::new(w / 2.0, d - 50.0),
        Leveling::ZTilt => Point::new(w / 2.0, 30.0),
    };

    BedGeometry {
        width: w,
        depth: d,
        height: bed.height,
        leveling,
        mesh: MeshBounds {
            min: Point::new(MESH_MARGIN, MESH_MARGIN),
            max: Point::new(w - MESH_MARGIN, d - MESH_MARGIN),
            probe_count: MESH_PROBE_COUNT,
        },
        center: Point::new(w / 2.0, d / 2.0),
        print_end_park,
        filament_park: Point::new(w / 2.0, 20.0),
        resonance_point: Point3 {
            x: w / 2.0,
            y: d / 2.0,
            z: RESONANCE_Z,
        },
    }
}

/// Picks the table row nearest to `length`; ties go to the smaller bed.
fn nearest_gantry_row(length: f64) -> &'static GantryRow {
    let mut best = &GANTRY_TABLE[0];
    for row in &GANTRY_TABLE[1..] {
        if (row.bed - length).abs() < (best.bed - length).abs() {
            best = row;
        }
    }
    best
}

fn gantry_leveling(width: f64, depth: f64) -> LevelingGeometry {
    let x_row = nearest_gantry_row(width);
    let y_row = nearest_gantry_row(depth);
    if (x_row.bed - width).abs() > f64::EPSILON || (y_row.bed - depth).abs() > f64::EPSILON {
        tracing::debug!(
            "No gantry table row for {width}x{depth}mm bed, using {}x{}mm coordinates",
            x_row.bed,
            y_row.bed
        );
    }

    let far_x = x_row.far_point.0;
    let far_y = y_row.far_point.1;
    LevelingGeometry::QuadGantry {
        corners: [
            GANTRY_NEAR_CORNER,
            Point::new(x_row.far_corner.0, y_row.far_corner.1),
        ],
        points: [
            GANTRY_NEAR_POINT,
            Point::new(GANTRY_NEAR_POINT.x, far_y),
            Point::new(far_x, far_y),
            Point::new(far_x, GANTRY_NEAR_POINT.y),
        ],
    }
}

fn z_tilt_leveling(w: f64, d: f64) -> LevelingGeometry {
    LevelingGeometry::ZTilt {
        z_positions: [
            Point::new(-50.0, 18.0),
            Point::new(w / 2.0, d + 50.0),
            Point::new(w + 50.0, 18.0),
        ],
        points: [
            Point::new(Z_TILT_PROBE_INSET, Z_TILT_PROBE_INSET),
            Point::new(w / 2.0, d - Z_TILT_PROBE_INSET),
            Point::new(w - Z_TILT_PROBE_INSET, Z_TILT_PROBE_INSET),
        ],
        bed_screws: [
            Point::new(BED_SCREW_INSET, BED_SCREW_INSET),
            Point::new(BED_SCREW_INSET, d - BED_SCREW_INSET),
            Point::new(w - BED_SCREW_INSET, d - BED_SCREW_INSET),
            Point::new(w - BED_SCREW_INSET, BED_SCREW_INSET),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MotionLimits;

    fn printer(leveling: Leveling) -> PrinterModel {
        PrinterModel {
            id: "test".to_string(),
            name: "Test".to_string(),
            leveling,
            limits: MotionLimits {
                max_velocity: 300,
                max_accel: 10000,
                max_z_velocity: 30,
                max_z_accel: 350,
                square_corner_velocity: 5.0,
            },
        }
    }

    fn bed(size: f64) -> BedSize {
        BedSize {
            id: format!("{size}"),
            name: format!("{size}mm"),
            width: size,
            depth: size,
            height: size,
        }
    }

    #[test]
    fn test_gantry_300_uses_literal_row() {
        let geometry = derive(&printer(Leveling::QuadGantry), &bed(300.0));
        let LevelingGeometry::QuadGantry { corners, points } = geometry.leveling else {
            panic!("expected gantry geometry");
        };
        assert_eq!(corners, [Point::new(-60.0, -10.0), Point::new(360.0, 310.0)]);
        assert_eq!(points[0], Point::new(50.0, 25.0));
        assert_eq!(points[2], Point::new(255.0, 255.0));
    }

    #[test]
    fn test_gantry_unsupported_size_uses_nearest_row() {
        let g = derive(&printer(Leveling::QuadGantry), &bed(320.0));
        let LevelingGeometry::QuadGantry { corners, .. } = g.leveling else {
            panic!("expected gantry geometry");
        };
        assert_eq!(corners[1], Point::new(360.0, 310.0));

        let g = derive(&printer(Leveling::QuadGantry), &bed(500.0));
        let LevelingGeometry::QuadGantry { corners, .. } = g.leveling else {
            panic!("expected gantry geometry");
        };
        assert_eq!(corners[1], Point::new(410.0, 360.0));
    }

    #[test]
    fn test_gantry_tie_prefers_smaller_bed() {
        let g = derive(&printer(Leveling::QuadGantry), &bed(275.0));
        let LevelingGeometry::QuadGantry { corners, .. } = g.leveling else {
            panic!("expected gantry geometry");
        };
        assert_eq!(corners[1], Point::new(310.0, 260.0));
    }

    #[test]
    fn test_gantry_rectangular_bed_follows_both_axes() {
        let mut rect = bed(300.0);
        rect.depth = 250.0;
        let g = derive(&printer(Leveling::QuadGantry), &rect);
        let LevelingGeometry::QuadGantry { corners, points } = g.leveling else {
            panic!("expected gantry geometry");
        };
        assert_eq!(corners, [Point::new(-60.0, -10.0), Point::new(360.0, 260.0)]);
        assert_eq!(
            points,
            [
                Point::new(50.0, 25.0),
                Point::new(50.0, 175.0),
                Point::new(255.0, 175.0),
                Point::new(255.0, 25.0),
            ]
        );
        assert!(points.iter().all(|p| p.within(300.0, 250.0)));
    }

    #[test]
    fn test_z_tilt_triangulation() {
        let g = derive(&printer(Leveling::ZTilt), &bed(250.0));
        let LevelingGeometry::ZTilt {
            z_positions,
            points,
            bed_screws,
        } = g.leveling
        else {
            panic!("expected z tilt geometry");
        };
        assert_eq!(z_positions[1], Point::new(125.0, 300.0));
        assert_eq!(z_positions[2], Point::new(300.0, 18.0));
        assert_eq!(
            points,
            [
                Point::new(30.0, 30.0),
                Point::new(125.0, 220.0),
                Point::new(220.0, 30.0)
            ]
        );
        assert_eq!(bed_screws[2], Point::new(220.0, 220.0));
    }

    #[test]
    fn test_mesh_inset_by_margin_for_every_size() {
        for size in [250.0, 300.0, 350.0] {
            for leveling in [Leveling::QuadGantry, Leveling::ZTilt] {
                let g = derive(&printer(leveling), &bed(size));
                assert_eq!(g.mesh.min, Point::new(40.0, 40.0));
                assert_eq!(g.mesh.max, Point::new(size - 40.0, size - 40.0));
                assert_eq!(g.mesh.probe_count, (7, 7));
                assert!(g.mesh.min.within(size, size) && g.mesh.max.within(size, size));
            }
        }
    }

    #[test]
    fn test_park_positions_follow_kinematics() {
        let gantry = derive(&printer(Leveling::QuadGantry), &bed(350.0));
        assert_eq!(gantry.center, Point::new(175.0, 175.0));
        assert_eq!(gantry.print_end_park, Point::new(175.0, 300.0));
        assert_eq!(gantry.filament_park, Point::new(175.0, 20.0));

        let tilt = derive(&printer(Leveling::ZTilt), &bed(300.0));
        assert_eq!(tilt.print_end_park, Point::new(150.0, 30.0));
        assert_eq!(tilt.resonance_point.z, 20.0);
    }

    #[test]
    fn test_probe_point_counts_per_kinematics() {
        let gantry = derive(&printer(Leveling::QuadGantry), &bed(250.0));
        assert_eq!(gantry.leveling.points().len(), 4);
        let tilt = derive(&printer(Leveling::ZTilt), &bed(250.0));
        assert_eq!(tilt.leveling.points().len(), 3);
    }
}
