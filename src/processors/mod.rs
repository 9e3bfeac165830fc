pub mod data_merger;
pub mod file_worker;
pub mod flag_splitter;
pub mod parallel_processor;
pub mod record_filter;

pub use data_merger::{DataMerger, PartialTable};
pub use file_worker::{FileOutcome, FileWorker};
pub use flag_splitter::{split_flags, PrecipFlags};
pub use parallel_processor::{AggregationReport, AggregationResult, ParallelProcessor};
pub use record_filter::{FilterStats, RecordFilter};
