use crate::analyzers::{CompletenessAnalyzer, PrecipitationAnalyzer};
use crate::cli::args::{Cli, Commands, ProcessArgs};
use crate::error::ProcessingError;
use crate::models::DateRange;
use crate::processors::{AggregationResult, ParallelProcessor};
use crate::readers::DatasetReader;
use crate::settings::PreprocessorConfig;
use crate::utils::filename::generate_completeness_filename;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvWriter;
use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, Level};
use validator::Validate;

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.verbose, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Process {
            config,
            args,
            no_progress,
        } => run_process(config, args, no_progress).await,

        Commands::Summary { file, json } => run_summary(&file, json),

        Commands::Completeness {
            file,
            start_date,
            end_date,
            threshold,
            output_file,
        } => run_completeness(&file, &start_date, &end_date, threshold, output_file),
    }
}

fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}

async fn run_process(
    config_file: Option<PathBuf>,
    args: ProcessArgs,
    no_progress: bool,
) -> Result<()> {
    let overrides = args.into_overrides()?;
    let config = PreprocessorConfig::load(config_file.as_deref(), &overrides)
        .context("Failed to load configuration")?;
    let output_path = config.resolved_output_path();

    println!("Processing GHCN-Daily station files...");
    println!("Input directory: {}", config.input_dir.display());
    println!("Output file: {}", output_path.display());
    println!(
        "Region: lat {}..{}, lon {}..{}",
        config.bounding_box.min_lat,
        config.bounding_box.max_lat,
        config.bounding_box.min_lon,
        config.bounding_box.max_lon
    );
    println!(
        "Dates: {} to {}, MFLAG keep-set: {}",
        config.date_range.start, config.date_range.end, config.keep_mflags
    );
    println!("Workers: {}", config.max_workers);

    let result = tokio::task::spawn_blocking(move || {
        let files = ParallelProcessor::discover_files(&config.input_dir)?;
        info!("Found {} station CSVs", files.len());

        let progress = ProgressReporter::new(
            files.len() as u64,
            "Processing station files...",
            no_progress,
        );
        let result = ParallelProcessor::new(&config).process_files(files, Some(&progress))?;
        progress.finish_with_message(&format!(
            "Processed {} files",
            result.report().files_completed()
        ));

        Ok::<_, ProcessingError>(result)
    })
    .await
    .map_err(ProcessingError::from)?
    .context("Processing failed")?;

    println!("\n{}", result.report().summary());

    match result {
        AggregationResult::NoStationsMatched { .. } => {
            println!("No stations matched filters - no output file written");
        }
        AggregationResult::Merged { records, .. } => {
            CsvWriter::new()
                .write_records(&records, &output_path)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;

            let summary = PrecipitationAnalyzer::new().analyze(&records)?;
            println!(
                "Saved {} records to {}",
                records.len(),
                output_path.display()
            );
            println!("\n{}", summary.detailed_summary());
            println!("Processing complete!");
        }
    }

    Ok(())
}

fn run_summary(file: &Path, json: bool) -> Result<()> {
    let summary = PrecipitationAnalyzer::new()
        .analyze_file(file)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Analyzing dataset: {}", file.display());
        println!("\n{}", summary.detailed_summary());
    }

    Ok(())
}

fn run_completeness(
    file: &Path,
    start_date: &str,
    end_date: &str,
    threshold: f64,
    output_file: Option<PathBuf>,
) -> Result<()> {
    let date_range = DateRange::parse(start_date, end_date).context("Invalid date range")?;
    date_range.validate().context("Invalid date range")?;
    let records = DatasetReader::new()
        .read_records(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    println!(
        "Loaded {} daily records from {}",
        records.len(),
        file.display()
    );

    let stations = CompletenessAnalyzer::new(date_range).compute(&records);
    let total = stations.len();
    let selected = CompletenessAnalyzer::filter_by_threshold(stations, threshold);

    println!("Total days in range: {}", date_range.num_days());
    println!("Total stations: {}", total);
    println!(
        "Stations with >= {}% completeness: {}",
        threshold,
        selected.len()
    );

    let output_path = output_file.unwrap_or_else(|| generate_completeness_filename(file));
    CsvWriter::new()
        .write_completeness(&selected, &output_path)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    println!("Saved completeness table to {}", output_path.display());

    Ok(())
}
