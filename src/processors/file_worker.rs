use crate::error::{ProcessingError, Result};
use crate::models::{BoundingBox, DateRange, KeepSet, StationRecord};
use crate::processors::RecordFilter;
use crate::readers::StationReader;
use crate::settings::PreprocessorConfig;
use std::path::Path;
use tracing::{debug, warn};

/// What a single station file contributed to the merged dataset
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Admitted(Vec<StationRecord>),
    /// Filename starts with an excluded prefix; the file was never opened
    Excluded,
    /// First row lies outside the bounding box
    OutsideRegion,
    NoRecordsInRange,
    AllRowsFiltered,
    /// Read or parse error, logged and isolated to this file
    Failed(String),
}

impl FileOutcome {
    pub fn record_count(&self) -> usize {
        match self {
            FileOutcome::Admitted(records) => records.len(),
            _ => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileOutcome::Admitted(_) => "admitted",
            FileOutcome::Excluded => "excluded",
            FileOutcome::OutsideRegion => "outside region",
            FileOutcome::NoRecordsInRange => "no records in range",
            FileOutcome::AllRowsFiltered => "all rows filtered",
            FileOutcome::Failed(_) => "failed",
        }
    }
}

/// Turns one station file into a filtered partial table
pub struct FileWorker {
    bounding_box: BoundingBox,
    date_range: DateRange,
    exclude_prefixes: Vec<String>,
    record_filter: RecordFilter,
    reader: StationReader,
}

impl FileWorker {
    pub fn new(
        bounding_box: BoundingBox,
        date_range: DateRange,
        exclude_prefixes: Vec<String>,
        keep_mflags: KeepSet,
    ) -> Self {
        Self {
            bounding_box,
            date_range,
            exclude_prefixes,
            record_filter: RecordFilter::new(keep_mflags),
            reader: StationReader::new(),
        }
    }

    pub fn from_config(config: &PreprocessorConfig) -> Self {
        Self::new(
            config.bounding_box,
            config.date_range,
            config.exclude_prefixes.clone(),
            config.keep_mflags.clone(),
        )
    }

    /// Prefix check on the file name only, no I/O
    pub fn is_excluded(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name() else {
            return false;
        };
        let file_name = file_name.to_string_lossy();

        self.exclude_prefixes
            .iter()
            .any(|prefix| file_name.starts_with(prefix.as_str()))
    }

    /// Process one file. Errors never escape: they are logged with the file
    /// name and reported as `FileOutcome::Failed`.
    pub fn process(&self, path: &Path) -> FileOutcome {
        if self.is_excluded(path) {
            let outcome = FileOutcome::Excluded;
            debug!("{}: {} by filename prefix", display_name(path), outcome.label());
            return outcome;
        }

        match self.try_process(path) {
            Ok(outcome) => {
                debug!(
                    "{}: {} ({} records)",
                    display_name(path),
                    outcome.label(),
                    outcome.record_count()
                );
                outcome
            }
            Err(e) => {
                warn!("Skipping {}: {}", display_name(path), e);
                FileOutcome::Failed(e.to_string())
            }
        }
    }

    fn try_process(&self, path: &Path) -> Result<FileOutcome> {
        let mut rows = self.reader.stream_observations(path)?;

        // The station is assumed stationary: its first row decides the whole file
        let first = rows.next().ok_or(ProcessingError::EmptyFile)??;
        if !self.bounding_box.contains(first.latitude, first.longitude) {
            debug!(
                "{}: location ({}, {}) outside bounding box",
                display_name(path),
                first.latitude,
                first.longitude
            );
            return Ok(FileOutcome::OutsideRegion);
        }

        let mut in_range = Vec::new();
        if self.date_range.contains(first.date) {
            in_range.push(first);
        }
        for row in rows {
            let row = row?;
            if self.date_range.contains(row.date) {
                in_range.push(row);
            }
        }

        if in_range.is_empty() {
            debug!(
                "{}: no records between {} and {}",
                display_name(path),
                self.date_range.start,
                self.date_range.end
            );
            return Ok(FileOutcome::NoRecordsInRange);
        }

        let (records, stats) = self.record_filter.filter_with_stats(in_range);
        debug!(
            "{}: kept {}/{} rows ({} bad MFLAG, {} failed QC, {} trace)",
            display_name(path),
            stats.kept_rows,
            stats.input_rows,
            stats.rejected_mflag,
            stats.rejected_qflag,
            stats.trace_zeroed
        );

        if records.is_empty() {
            return Ok(FileOutcome::AllRowsFiltered);
        }

        Ok(FileOutcome::Admitted(records))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
