mod aggregator;
mod alarms;
mod categorizer;
mod cli;
mod error;
mod fmt;
mod frequency;
mod fuzzy;
mod importer;
mod models;
mod normalizer;
#[cfg(feature = "pdf")]
mod pdf;
mod profiles;
mod reports;
mod savings;
mod settings;
#[cfg(feature = "xlsx")]
mod spreadsheet;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands, ConfigCommands};

fn main() {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > warn
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            log_fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let result = match cli.command {
        Commands::Analyze { file, run, top } => cli::analyze::run(&file, &run, top),
        Commands::Export {
            file,
            run,
            output_dir,
        } => cli::export::run(&file, &run, output_dir),
        Commands::Columns { file } => cli::columns::run(&file),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Init { force } => cli::config::init(force),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "costscan", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        if e.is_warning() {
            eprintln!("Warning: {e}");
            std::process::exit(2);
        }
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
