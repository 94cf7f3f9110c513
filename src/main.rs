//! voronconf - Klipper printer.cfg compiler for Voron printers
//!
//! Compiles a hardware selection (printer, bed size, boards, motors,
//! extruder, probe and macro style) into a complete printer.cfg.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voronconf::cli::{CatalogArgs, ConfigArgs, ExitCode, GenerateArgs, ReferencesArgs};

/// voronconf - Klipper printer.cfg compiler for Voron 2.4 and Trident
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a printer.cfg
    Generate(GenerateArgs),
    /// List selectable components
    Catalog(CatalogArgs),
    /// List vendor reference configs
    References(ReferencesArgs),
    /// Manage the configuration file
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so generated output on stdout stays clean
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        Command::Generate(args) => args.execute(),
        Command::Catalog(args) => args.execute(),
        Command::References(args) => args.execute(),
        Command::Config(args) => args.execute(),
    };

    match result {
        Ok(()) => std::process::exit(ExitCode::Success.code()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code().code());
        }
    }
}
