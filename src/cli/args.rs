use crate::error::Result;
use crate::models::KeepSet;
use crate::settings::ConfigOverrides;
use crate::utils::constants::DEFAULT_COMPLETENESS_THRESHOLD;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ghcn-preprocessor")]
#[command(about = "High-performance GHCN-Daily precipitation preprocessor")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Filter, clean and merge a directory of station CSVs
    Process {
        #[arg(short, long, help = "Configuration file (TOML, YAML or JSON)")]
        config: Option<PathBuf>,

        #[command(flatten)]
        args: ProcessArgs,

        #[arg(long, default_value = "false", help = "Hide the progress bar")]
        no_progress: bool,
    },

    /// Display summary statistics for a merged dataset
    Summary {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, default_value = "false", help = "Print the summary as JSON")]
        json: bool,
    },

    /// Compute per-station completeness of a merged dataset
    Completeness {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, help = "First day of the range (YYYY-MM-DD)")]
        start_date: String,

        #[arg(long, help = "Last day of the range (YYYY-MM-DD)")]
        end_date: String,

        #[arg(long, default_value_t = DEFAULT_COMPLETENESS_THRESHOLD)]
        threshold: f64,

        #[arg(
            short,
            long,
            help = "Output CSV path [default: {FILE}-completeness.csv]"
        )]
        output_file: Option<PathBuf>,
    },
}

/// Arguments of the `process` command that feed the configuration layers
#[derive(Args, Debug, Clone, Default)]
pub struct ProcessArgs {
    #[arg(short, long, help = "Directory containing per-station CSV files")]
    pub input_dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Output CSV path [default: output/ghcn-precip-{START}-{END}.csv]"
    )]
    pub output_file: Option<PathBuf>,

    #[arg(long, allow_hyphen_values = true)]
    pub min_lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub max_lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub min_lon: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub max_lon: Option<f64>,

    #[arg(long, help = "First day to keep (YYYY-MM-DD) [default: 2010-01-01]")]
    pub start_date: Option<String>,

    #[arg(long, help = "Last day to keep (YYYY-MM-DD) [default: 2024-12-31]")]
    pub end_date: Option<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Filename prefixes to skip [default: US1]"
    )]
    pub exclude_prefixes: Option<Vec<String>>,

    #[arg(
        long,
        help = "MFLAG keep-set preset: standard or conservative",
        conflicts_with = "keep_mflags"
    )]
    pub mflag_policy: Option<String>,

    #[arg(
        long,
        help = "Explicit MFLAG keep-set, e.g. 'blank,G,B,N,S,T'"
    )]
    pub keep_mflags: Option<String>,

    #[arg(long)]
    pub max_workers: Option<usize>,

    #[arg(long, help = "Log progress every N completed files [default: 200]")]
    pub progress_interval: Option<usize>,
}

impl ProcessArgs {
    pub fn into_overrides(self) -> Result<ConfigOverrides> {
        let keep_mflags = match (self.keep_mflags, self.mflag_policy) {
            (Some(list), _) => Some(KeepSet::parse(&list)),
            (None, Some(policy)) => Some(KeepSet::preset(&policy)?),
            (None, None) => None,
        };

        Ok(ConfigOverrides {
            input_dir: self.input_dir,
            output_path: self.output_file,
            min_lat: self.min_lat,
            max_lat: self.max_lat,
            min_lon: self.min_lon,
            max_lon: self.max_lon,
            start_date: self.start_date,
            end_date: self.end_date,
            exclude_prefixes: self.exclude_prefixes,
            keep_mflags,
            max_workers: self.max_workers,
            progress_interval: self.progress_interval,
        })
    }
}
