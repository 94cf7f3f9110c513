//! voronconf Library
//!
//! This library compiles Voron 2.4 and Trident hardware selections into
//! complete Klipper `printer.cfg` files. A static component catalog is
//! resolved against a selection, bed geometry is derived from the printer
//! and bed size, and typed section generators build the document.

// Module declarations
pub mod catalog;
pub mod cli;
pub mod config;
pub mod constants;
pub mod generator;
pub mod models;
pub mod reference;
pub mod services;
#[cfg(feature = "web")]
pub mod web;
