// Command-line arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use spstream_core::config::AnalysisSettings;

/// Starting-pitcher streaming recommendations for the coming fantasy week
#[derive(Parser, Debug)]
#[command(name = "spstream")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Analyze as of this date (YYYY-MM-DD) instead of today
    #[arg(short, long)]
    pub date: Option<NaiveDate>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Directory holding config/, defaults/, data/ and logs/
    #[arg(short = 'p', long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Show every waiver pitcher regardless of ownership
    #[arg(long, conflicts_with = "max_owned")]
    pub all: bool,

    /// Override the waiver ownership ceiling (percent)
    #[arg(long)]
    pub max_owned: Option<f64>,

    /// Only analyze pitchers already on the roster
    #[arg(long)]
    pub roster_only: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// Pretty-printed JSON
    Json,
}

impl Cli {
    /// Apply command-line overrides on top of the configured settings.
    pub fn apply_overrides(&self, mut settings: AnalysisSettings) -> AnalysisSettings {
        if self.all {
            settings.min_ownership_pct = 0.0;
        }
        if let Some(pct) = self.max_owned {
            settings.min_ownership_pct = pct;
        }
        if self.roster_only {
            settings.include_waiver = false;
        }
        settings
    }
}
