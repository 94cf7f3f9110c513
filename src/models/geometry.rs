//! Bed-size-dependent coordinates.

use serde::Serialize;
use std::fmt;

/// A point in the XY plane, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether the point lies inside the rectangle `[0,width] x [0,depth]`.
    #[must_use]
    pub fn within(&self, width: f64, depth: f64) -> bool {
        (0.0..=width).contains(&self.x) && (0.0..=depth).contains(&self.y)
    }
}

/// Formats as `x, y`; whole millimetres print without a fraction.
impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.x, self.y)
    }
}

/// A point in space, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

/// Rectangular bed mesh area and probe grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeshBounds {
    /// Front-left corner
    pub min: Point,
    /// Rear-right corner
    pub max: Point,
    /// Probe grid (columns, rows)
    pub probe_count: (u32, u32),
}

/// Leveling-specific coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LevelingGeometry {
    /// Four-motor gantry leveling.
    QuadGantry {
        /// Front-left and rear-right gantry corners
        corners: [Point; 2],
        /// Probe points, counter-clockwise from front-left
        points: [Point; 4],
    },
    /// Three-motor Z tilt.
    ZTilt {
        /// Z motor pivot positions: front-left, rear-center, front-right
        z_positions: [Point; 3],
        /// Probe points matching the motor layout
        points: [Point; 3],
        /// Manual tramming screws, one per corner
        bed_screws: [Point; 4],
    },
}

impl LevelingGeometry {
    /// Probe points used by the leveling routine.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        match self {
            Self::QuadGantry { points, .. } => points,
            Self::ZTilt { points, .. } => points,
        }
    }
}

/// Everything the generators need to know about bed coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedGeometry {
    /// X travel
    pub width: f64,
    /// Y travel
    pub depth: f64,
    /// Z travel
    pub height: f64,
    /// Leveling coordinates
    pub leveling: LevelingGeometry,
    /// Bed mesh area
    pub mesh: MeshBounds,
    /// Bed midpoint, used for safe homing and center park
    pub center: Point,
    /// Where `PRINT_END` parks the toolhead
    pub print_end_park: Point,
    /// Where `M600` parks the toolhead
    pub filament_park: Point,
    /// Resonance measurement point
    pub resonance_point: Point3,
}
