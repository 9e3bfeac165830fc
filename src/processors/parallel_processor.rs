use crate::error::{ProcessingError, Result};
use crate::models::StationRecord;
use crate::processors::data_merger::{DataMerger, PartialTable};
use crate::processors::file_worker::{FileOutcome, FileWorker};
use crate::settings::PreprocessorConfig;
use crate::utils::constants::STATION_FILE_EXTENSION;
use crate::utils::progress::ProgressReporter;
use serde::Serialize;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Per-run tally of file outcomes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregationReport {
    pub files_discovered: usize,
    pub files_admitted: usize,
    pub files_excluded: usize,
    pub files_outside_region: usize,
    pub files_without_records_in_range: usize,
    pub files_fully_filtered: usize,
    pub files_failed: usize,
    pub records: usize,
}

impl AggregationReport {
    pub fn new(files_discovered: usize) -> Self {
        Self {
            files_discovered,
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: &FileOutcome) {
        match outcome {
            FileOutcome::Admitted(records) => {
                self.files_admitted += 1;
                self.records += records.len();
            }
            FileOutcome::Excluded => self.files_excluded += 1,
            FileOutcome::OutsideRegion => self.files_outside_region += 1,
            FileOutcome::NoRecordsInRange => self.files_without_records_in_range += 1,
            FileOutcome::AllRowsFiltered => self.files_fully_filtered += 1,
            FileOutcome::Failed(_) => self.files_failed += 1,
        }
    }

    pub fn files_completed(&self) -> usize {
        self.files_admitted
            + self.files_excluded
            + self.files_outside_region
            + self.files_without_records_in_range
            + self.files_fully_filtered
            + self.files_failed
    }

    pub fn summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== File Summary ===\n");
        summary.push_str(&format!("Files discovered: {}\n", self.files_discovered));
        summary.push_str(&format!("Admitted: {}\n", self.files_admitted));
        summary.push_str(&format!("Excluded by prefix: {}\n", self.files_excluded));
        summary.push_str(&format!("Outside bounding box: {}\n", self.files_outside_region));
        summary.push_str(&format!(
            "No records in date range: {}\n",
            self.files_without_records_in_range
        ));
        summary.push_str(&format!("All rows filtered: {}\n", self.files_fully_filtered));
        summary.push_str(&format!("Failed: {}\n", self.files_failed));

        summary
    }
}

/// Result of a full aggregation run
#[derive(Debug)]
pub enum AggregationResult {
    Merged {
        records: Vec<StationRecord>,
        report: AggregationReport,
    },
    /// Every file was rejected or filtered to nothing. Not an error.
    NoStationsMatched { report: AggregationReport },
}

impl AggregationResult {
    pub fn report(&self) -> &AggregationReport {
        match self {
            AggregationResult::Merged { report, .. } => report,
            AggregationResult::NoStationsMatched { report } => report,
        }
    }
}

/// Fans one `FileWorker` task per file across a bounded pool and merges the
/// partial tables
pub struct ParallelProcessor {
    max_workers: usize,
    progress_interval: usize,
    worker: Arc<FileWorker>,
}

impl ParallelProcessor {
    pub fn new(config: &PreprocessorConfig) -> Self {
        Self {
            max_workers: config.max_workers.max(1),
            progress_interval: config.progress_interval.max(1),
            worker: Arc::new(FileWorker::from_config(config)),
        }
    }

    pub fn with_worker(worker: FileWorker, max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            progress_interval: crate::utils::constants::DEFAULT_PROGRESS_INTERVAL,
            worker: Arc::new(worker),
        }
    }

    pub fn with_progress_interval(mut self, progress_interval: usize) -> Self {
        self.progress_interval = progress_interval.max(1);
        self
    }

    /// Name-sorted list of the station CSVs directly inside `dir`.
    ///
    /// An empty listing is fatal.
    pub fn discover_files(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ProcessingError::Config(format!(
                "Input path is not a directory: {}",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == STATION_FILE_EXTENSION) {
                files.push(path);
            }
        }

        if files.is_empty() {
            return Err(ProcessingError::NoInputFiles(dir.to_path_buf()));
        }

        files.sort();
        Ok(files)
    }

    /// Process every station CSV in `dir`
    pub fn process_directory(
        &self,
        dir: &Path,
        progress: Option<&ProgressReporter>,
    ) -> Result<AggregationResult> {
        let files = Self::discover_files(dir)?;
        info!("Found {} station CSVs in {}", files.len(), dir.display());

        if let Some(p) = progress {
            p.set_message(&format!("Processing {} station files...", files.len()));
        }

        self.process_files(files, progress)
    }

    /// Run the configured `FileWorker` over an explicit file list. Indices in
    /// the list decide tie order in the merged output.
    pub fn process_files(
        &self,
        files: Vec<PathBuf>,
        progress: Option<&ProgressReporter>,
    ) -> Result<AggregationResult> {
        let worker = Arc::clone(&self.worker);
        self.process_files_with(files, move |path| worker.process(path), progress)
    }

    /// Fan `task` out over `files` and merge whatever the tasks admit.
    ///
    /// Each task runs behind a panic boundary; a panic is logged and counted
    /// as a failed file. Outcomes are consumed in completion order.
    pub fn process_files_with<F>(
        &self,
        files: Vec<PathBuf>,
        task: F,
        progress: Option<&ProgressReporter>,
    ) -> Result<AggregationResult>
    where
        F: Fn(&Path) -> FileOutcome + Send + Sync + 'static,
    {
        let total = files.len();
        let task = Arc::new(task);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .thread_name(|i| format!("ghcn-worker-{}", i))
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let (tx, rx) = crossbeam::channel::unbounded::<(usize, FileOutcome)>();

        for (index, path) in files.into_iter().enumerate() {
            let tx = tx.clone();
            let task = Arc::clone(&task);
            pool.spawn(move || {
                let outcome = run_isolated(task.as_ref(), &path);
                // The receiver stays alive until every task has reported
                let _ = tx.send((index, outcome));
            });
        }
        drop(tx);

        let mut report = AggregationReport::new(total);
        let mut partials = Vec::new();

        for (index, outcome) in rx.iter() {
            report.record(&outcome);
            if let FileOutcome::Admitted(records) = outcome {
                partials.push(PartialTable::new(index, records));
            }

            let completed = report.files_completed();
            if let Some(p) = progress {
                p.update(completed as u64);
            }
            if completed % self.progress_interval == 0 {
                info!("Processed {}/{} files...", completed, total);
            }
        }

        if report.files_completed() != total {
            warn!(
                "{} of {} file tasks never reported",
                total - report.files_completed(),
                total
            );
        }

        if partials.is_empty() {
            info!("No stations matched filters");
            return Ok(AggregationResult::NoStationsMatched { report });
        }

        info!(
            "Merging {} partial tables ({} records)...",
            partials.len(),
            report.records
        );
        let records = DataMerger::new().merge(partials);

        Ok(AggregationResult::Merged { records, report })
    }
}

fn run_isolated<F>(task: &F, path: &Path) -> FileOutcome
where
    F: Fn(&Path) -> FileOutcome + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| task(path))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let err = ProcessingError::WorkerPanic(panic_message(payload.as_ref()));
            error!("Skipping {}: {}", path.display(), err);
            FileOutcome::Failed(err.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
