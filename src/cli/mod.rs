//! CLI command handlers for voronconf.
//!
//! This module provides headless, scriptable access to the compiler and its
//! catalog for automation, testing, and CI/CD integration.

pub mod catalog;
pub mod common;
pub mod config;
pub mod generate;
pub mod references;

// Re-export types used by main.rs and tests
pub use catalog::CatalogArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use generate::GenerateArgs;
pub use references::ReferencesArgs;
