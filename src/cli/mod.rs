pub mod analyze;
pub mod columns;
pub mod config;
pub mod export;

use std::path::Path;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::importer::{load_ledger, ColumnSynonyms};
use crate::reports::{Pipeline, Report};
use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(
    name = "costscan",
    version,
    about = "Scan an expense ledger for recurring costs, cost alarms and savings potential."
)]
pub struct Cli {
    /// Log pipeline progress to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Per-run overrides of the saved settings.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// First year to include
    #[arg(long = "year-min")]
    pub year_min: Option<i32>,
    /// Last year to include
    #[arg(long = "year-max")]
    pub year_max: Option<i32>,
    /// Alarm threshold in percent (5-50)
    #[arg(long)]
    pub threshold: Option<u32>,
    /// Minimum base amount for alarms
    #[arg(long = "min-base")]
    pub min_base: Option<f64>,
}

impl RunArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(y) = self.year_min {
            settings.year_min = y;
        }
        if let Some(y) = self.year_max {
            settings.year_max = y;
        }
        if let Some(t) = self.threshold {
            settings.alarm_threshold_pct = t;
        }
        if let Some(m) = self.min_base {
            settings.alarm_min_base = m;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a ledger and print trend, alarm and savings tables.
    Analyze {
        /// Path to CSV or XLSX ledger
        file: String,
        #[command(flatten)]
        run: RunArgs,
        /// Show only the first N rows of each table
        #[arg(long)]
        top: Option<usize>,
    },
    /// Analyze a ledger and write the spreadsheet and PDF summary.
    Export {
        /// Path to CSV or XLSX ledger
        file: String,
        #[command(flatten)]
        run: RunArgs,
        /// Output directory (default: output_dir setting)
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
    },
    /// Show which ledger columns are used for each role.
    Columns {
        /// Path to CSV or XLSX ledger
        file: String,
    },
    /// Show or change saved settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completions.
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings.
    Show,
    /// Write a settings file with the defaults.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Set one value, e.g. `costscan config set alarm_threshold_pct 15`.
    Set {
        key: String,
        value: String,
    },
}

/// Load settings, apply overrides, read the ledger and run the analysis.
pub(crate) fn run_pipeline(file: &str, run: &RunArgs) -> Result<(Settings, Report)> {
    let mut settings = load_settings();
    run.apply(&mut settings);
    let config = settings.analysis_config();
    config.validate()?;

    let rows = load_ledger(Path::new(file), &ColumnSynonyms::default())?;
    let report = Pipeline::new(&settings.ampersand_word).run(&rows, &config)?;
    Ok((settings, report))
}
