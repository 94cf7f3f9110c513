//! Catalog listing command.

use crate::catalog::{EntrySummary, Registry};
use crate::cli::common::{print_json, CliError, CliResult};
use crate::models::Category;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeMap;

/// List the hardware components available for selection
#[derive(Debug, Clone, Args)]
pub struct CatalogArgs {
    /// Only list one category (e.g. control_board, probes, toolhead-boards)
    #[arg(short, long, value_name = "NAME")]
    pub category: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct CatalogResponse<'a> {
    version: &'a str,
    categories: BTreeMap<Category, &'a [EntrySummary]>,
}

impl CatalogArgs {
    /// Execute the catalog command
    pub fn execute(&self) -> CliResult<()> {
        let filter = self
            .category
            .as_deref()
            .map(str::parse::<Category>)
            .transpose()
            .map_err(CliError::validation)?;

        let registry = Registry::load()
            .map_err(|e| CliError::io(format!("Failed to load component catalog: {e}")))?;
        let summary = registry.summary();

        let categories: BTreeMap<Category, &[EntrySummary]> = summary
            .categories
            .iter()
            .filter(|(category, _)| filter.map_or(true, |f| f == **category))
            .map(|(category, entries)| (*category, entries.as_slice()))
            .collect();

        if self.json {
            return print_json(&CatalogResponse {
                version: &summary.version,
                categories,
            });
        }

        println!("Component catalog (version {})", summary.version);
        for (category, entries) in categories {
            println!();
            println!("{} ({}):", category.label(), category.as_str());
            for entry in entries {
                let marker = if entry.default { " (default)" } else { "" };
                println!("  {:<20} {}{}", entry.id, entry.name, marker);
            }
        }

        Ok(())
    }
}
