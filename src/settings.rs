use crate::error::{ProcessingError, Result};
use crate::models::{BoundingBox, DateRange, KeepSet};
use crate::utils::constants::{
    COCORAHS_PREFIX, DEFAULT_END_DATE, DEFAULT_PROGRESS_INTERVAL, DEFAULT_START_DATE, ENV_PREFIX,
    STANDARD_KEEP_MFLAGS,
};
use crate::utils::filename::generate_default_output_filename;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::{Validate, ValidationError};

/// Construction-time configuration of a preprocessing run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreprocessorConfig {
    pub input_dir: PathBuf,

    /// Defaults to `output/ghcn-precip-{start}-{end}.csv`
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    #[validate(nested)]
    pub bounding_box: BoundingBox,

    #[validate(nested)]
    pub date_range: DateRange,

    #[validate(custom(function = "validate_prefixes"))]
    pub exclude_prefixes: Vec<String>,

    #[validate(custom(function = "validate_keep_set"))]
    pub keep_mflags: KeepSet,

    #[validate(range(min = 1))]
    pub max_workers: usize,

    #[validate(range(min = 1))]
    pub progress_interval: usize,
}

/// Values given explicitly on the command line. They win over every other
/// configuration source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub min_lat: Option<f64>,
    pub max_lat: Option<f64>,
    pub min_lon: Option<f64>,
    pub max_lon: Option<f64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub exclude_prefixes: Option<Vec<String>>,
    pub keep_mflags: Option<KeepSet>,
    pub max_workers: Option<usize>,
    pub progress_interval: Option<usize>,
}

impl PreprocessorConfig {
    /// Configuration with the documented defaults for everything except the
    /// input directory and the region
    pub fn new(input_dir: impl Into<PathBuf>, bounding_box: BoundingBox) -> Result<Self> {
        Ok(Self {
            input_dir: input_dir.into(),
            output_path: None,
            bounding_box,
            date_range: DateRange::parse(DEFAULT_START_DATE, DEFAULT_END_DATE)?,
            exclude_prefixes: vec![COCORAHS_PREFIX.to_string()],
            keep_mflags: KeepSet::standard(),
            max_workers: num_cpus::get(),
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        })
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn with_exclude_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.exclude_prefixes = prefixes;
        self
    }

    pub fn with_keep_mflags(mut self, keep_mflags: KeepSet) -> Self {
        self.keep_mflags = keep_mflags;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval;
        self
    }

    /// Layer defaults, an optional config file, `GHCN_*` environment
    /// variables and explicit overrides, then validate the result.
    ///
    /// Nested keys use `__` in environment variables, e.g.
    /// `GHCN_BOUNDING_BOX__MIN_LAT=30`. List keys take comma separated
    /// values, e.g. `GHCN_KEEP_MFLAGS=",B,S"` (an empty item is the blank code).
    pub fn load(config_file: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("date_range.start", DEFAULT_START_DATE)?
            .set_default("date_range.end", DEFAULT_END_DATE)?
            .set_default("exclude_prefixes", vec![COCORAHS_PREFIX])?
            .set_default("keep_mflags", STANDARD_KEEP_MFLAGS.to_vec())?
            .set_default("max_workers", num_cpus::get() as i64)?
            .set_default("progress_interval", DEFAULT_PROGRESS_INTERVAL as i64)?;

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ProcessingError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("exclude_prefixes")
                .with_list_parse_key("keep_mflags")
                .try_parsing(true),
        );

        let path_string = |p: &Option<PathBuf>| p.as_ref().map(|p| p.to_string_lossy().into_owned());

        builder = builder
            .set_override_option("input_dir", path_string(&overrides.input_dir))?
            .set_override_option("output_path", path_string(&overrides.output_path))?
            .set_override_option("bounding_box.min_lat", overrides.min_lat)?
            .set_override_option("bounding_box.max_lat", overrides.max_lat)?
            .set_override_option("bounding_box.min_lon", overrides.min_lon)?
            .set_override_option("bounding_box.max_lon", overrides.max_lon)?
            .set_override_option("date_range.start", overrides.start_date.clone())?
            .set_override_option("date_range.end", overrides.end_date.clone())?
            .set_override_option("exclude_prefixes", overrides.exclude_prefixes.clone())?
            .set_override_option(
                "keep_mflags",
                overrides.keep_mflags.as_ref().map(|k| k.codes().to_vec()),
            )?
            .set_override_option("max_workers", overrides.max_workers.map(|w| w as i64))?
            .set_override_option(
                "progress_interval",
                overrides.progress_interval.map(|i| i as i64),
            )?;

        let config: PreprocessorConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Output path, falling back to the default name for the date range
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| generate_default_output_filename(&self.date_range))
    }
}

fn validate_prefixes(prefixes: &[String]) -> std::result::Result<(), ValidationError> {
    if prefixes.iter().any(|p| p.is_empty()) {
        let mut err = ValidationError::new("empty_prefix");
        err.message = Some("an empty exclusion prefix would exclude every file".into());
        return Err(err);
    }
    Ok(())
}

fn validate_keep_set(keep_mflags: &KeepSet) -> std::result::Result<(), ValidationError> {
    if keep_mflags.is_empty() {
        let mut err = ValidationError::new("empty_keep_set");
        err.message = Some("keep_mflags must list at least one MFLAG code".into());
        return Err(err);
    }
    Ok(())
}
