pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{generate_completeness_filename, generate_default_output_filename};
pub use progress::ProgressReporter;
