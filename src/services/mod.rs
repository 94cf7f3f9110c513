//! Service layer for business logic.
//!
//! This module contains the compilation pipeline: resolving a raw selection
//! against the catalog, deriving bed geometry, and compiling the result into
//! a configuration document.

pub mod compiler;
pub mod geometry;
pub mod resolver;

// Re-export commonly used types and functions
pub use compiler::{compile, GenerationResponse};
pub use resolver::resolve;
