use crate::error::Result;
use crate::models::StationRecord;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use std::path::Path;

/// Reads a merged dataset previously written by `CsvWriter`
pub struct DatasetReader;

impl DatasetReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_records(&self, path: &Path) -> Result<Vec<StationRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_path(path)?;

        let mut records = Vec::new();
        for record in reader.deserialize() {
            records.push(record?);
        }

        Ok(records)
    }
}

impl Default for DatasetReader {
    fn default() -> Self {
        Self::new()
    }
}
