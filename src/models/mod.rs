//! Data models for hardware components, selections, geometry and documents.
//!
//! Models are plain data. Catalog loading lives in [`crate::catalog`] and the
//! compilation pipeline in [`crate::services`] and [`crate::generator`].

pub mod category;
pub mod components;
pub mod document;
pub mod geometry;
pub mod selection;

// Re-export all model types
pub use category::Category;
pub use components::{
    AccelerometerPins, BedSize, BoardEndstops, BoardFanPins, BoardSteppers, Connection,
    ControlBoard, DriverFamily, DriverPin, ExtruderModel, HeaterPins, Leveling, MacroFlavor,
    MacroStyle, MotionLimits, MotorKit, MotorSpec, Pin, PinSource, PrinterModel, ProbeKind,
    ProbeModel, StepperPins, ThermistorPins, ToolheadBoard, ToolheadFanPins,
};
pub use document::{
    ConfigBlock, ConfigurationDocument, DocumentMetadata, GeneratedSection, Line, SectionKind,
};
pub use geometry::{BedGeometry, LevelingGeometry, MeshBounds, Point, Point3};
pub use selection::{RawSelection, Resolution, ResolvedSelection};
