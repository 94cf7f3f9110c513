//! Generate command for printer.cfg files.

use crate::catalog::Registry;
use crate::cli::common::{print_json, CliError, CliResult};
use crate::config::Config;
use crate::generator::DocumentValidator;
use crate::models::{Category, RawSelection};
use crate::services::{compile, GenerationResponse};
use clap::Args;
use std::path::{Path, PathBuf};

/// Generate a printer.cfg from hardware selections
#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// JSON request file (same fields as the web API); flags override it
    #[arg(short, long, value_name = "FILE")]
    pub request: Option<PathBuf>,

    /// Printer model (voron2.4, trident)
    #[arg(long, value_name = "KEY")]
    pub printer: Option<String>,

    /// Bed size (250, 300, 350)
    #[arg(long, value_name = "KEY")]
    pub bed_size: Option<String>,

    /// Main control board
    #[arg(long, value_name = "KEY")]
    pub board: Option<String>,

    /// Toolhead board
    #[arg(long, value_name = "KEY")]
    pub toolhead: Option<String>,

    /// Motor kit
    #[arg(long, value_name = "KEY")]
    pub motors: Option<String>,

    /// Extruder
    #[arg(long, value_name = "KEY")]
    pub extruder: Option<String>,

    /// Z probe
    #[arg(long, value_name = "KEY")]
    pub probe: Option<String>,

    /// Macro style (standard, better)
    #[arg(long, value_name = "KEY")]
    pub macros: Option<String>,

    /// Output file, or directory to write the configured file name into
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Print the generation response as JSON instead of raw text
    #[arg(long)]
    pub json: bool,

    /// Use a fixed timestamp for reproducible output
    #[arg(long)]
    pub deterministic: bool,

    /// Treat validation warnings as errors
    #[arg(long)]
    pub strict: bool,
}

impl GenerateArgs {
    /// Builds the raw selection from the request file and flags.
    fn selection(&self) -> CliResult<RawSelection> {
        let mut raw = match &self.request {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|e| {
                    CliError::io(format!("Failed to read request {}: {e}", path.display()))
                })?;
                let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|e| {
                    CliError::validation(format!("Invalid JSON in {}: {e}", path.display()))
                })?;
                RawSelection::from_json_value(&value)
            }
            None => RawSelection::new(),
        };

        let flags = [
            (Category::Printer, &self.printer),
            (Category::BedSize, &self.bed_size),
            (Category::ControlBoard, &self.board),
            (Category::ToolheadBoard, &self.toolhead),
            (Category::MotorKit, &self.motors),
            (Category::Extruder, &self.extruder),
            (Category::Probe, &self.probe),
            (Category::MacroStyle, &self.macros),
        ];
        for (category, value) in flags {
            if let Some(key) = value {
                raw.set(category, key.as_str());
            }
        }

        Ok(raw)
    }

    /// Execute the generate command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))?;
        let registry = Registry::load()
            .map_err(|e| CliError::io(format!("Failed to load component catalog: {e}")))?;

        let raw = self.selection()?;
        let mut document = compile(&registry, &raw);
        if self.deterministic {
            document.normalize_for_deterministic();
        }

        for entry in &document.metadata().defaulted {
            eprintln!("Note: using default for {entry}");
        }

        let report = DocumentValidator::new(&document).validate();
        if !report.is_valid() || (self.strict && !report.warnings.is_empty()) {
            return Err(CliError::validation(format!(
                "Generated configuration failed validation:\n{}",
                report.format_message()
            )));
        }
        if !report.warnings.is_empty() {
            eprint!("{}", report.format_message());
        }

        let response = GenerationResponse::with_filename(&document, config.output.filename.clone());

        match &self.out {
            Some(out) => {
                let path = output_path(out, &config.output.filename);
                let content = if self.json {
                    serde_json::to_string_pretty(&response)
                        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
                } else {
                    response.config
                };
                if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                    std::fs::create_dir_all(dir).map_err(|e| {
                        CliError::io(format!("Failed to create output directory: {e}"))
                    })?;
                }
                std::fs::write(&path, content)
                    .map_err(|e| CliError::io(format!("Failed to write {}: {e}", path.display())))?;

                println!("✓ Generated {}", path.display());
            }
            None if self.json => print_json(&response)?,
            None => println!("{}", response.config),
        }

        Ok(())
    }
}

/// A directory (existing, or spelled with a trailing separator) receives the
/// configured file name; anything else is the file itself.
fn output_path(out: &Path, filename: &str) -> PathBuf {
    let trailing = out
        .as_os_str()
        .to_str()
        .is_some_and(|s| s.ends_with('/') || s.ends_with(std::path::MAIN_SEPARATOR));
    if out.is_dir() || trailing {
        out.join(filename)
    } else {
        out.to_path_buf()
    }
}
