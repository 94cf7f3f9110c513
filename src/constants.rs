//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and output defaults.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Voron Configurator";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "voronconf";

/// Directory under the platform config dir that holds `config.toml`.
pub const CONFIG_DIR_NAME: &str = "VoronConfigurator";

/// File name Klipper loads as its main configuration.
pub const DEFAULT_FILENAME: &str = "printer.cfg";

/// Timestamp written by deterministic builds.
pub const DETERMINISTIC_TIMESTAMP: &str = "1970-01-01T00:00:00+00:00";
