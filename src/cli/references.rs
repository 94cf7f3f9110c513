//! Reference config listing command.

use crate::cli::common::{print_json, CliResult};
use crate::reference;
use clap::Args;

/// List the vendor reference configs that can be compared against
#[derive(Debug, Clone, Args)]
pub struct ReferencesArgs {
    /// Only list references for one printer (voron2.4, trident)
    #[arg(short, long, value_name = "KEY")]
    pub printer: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

impl ReferencesArgs {
    /// Execute the references command
    pub fn execute(&self) -> CliResult<()> {
        let mut listing = reference::listing();
        if let Some(printer) = &self.printer {
            listing.retain(|_, r| r.printer_type == printer);
        }

        if self.json {
            return print_json(&listing);
        }

        if listing.is_empty() {
            println!("No reference configs found.");
            return Ok(());
        }

        println!("Reference configs ({}):", listing.len());
        println!();
        for (key, entry) in &listing {
            println!("  {:<28} {}", key, entry.name);
            println!("  {:<28} {}", "", entry.url);
        }

        Ok(())
    }
}
