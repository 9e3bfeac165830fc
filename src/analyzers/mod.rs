pub mod completeness;
pub mod precipitation_analyzer;

pub use completeness::{CompletenessAnalyzer, StationCompleteness};
pub use precipitation_analyzer::{DatasetSummary, PrcpDistribution, PrecipitationAnalyzer};
