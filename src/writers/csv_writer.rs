use crate::analyzers::StationCompleteness;
use crate::error::{ProcessingError, Result};
use crate::models::StationRecord;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Writes CSV tables through a temporary file in the destination directory,
/// renamed into place only once fully written
pub struct CsvWriter {
    buffer_capacity: usize,
}

impl CsvWriter {
    pub fn new() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Write the merged dataset. Header order follows `StationRecord`.
    pub fn write_records(&self, records: &[StationRecord], path: &Path) -> Result<()> {
        self.write_rows(records, path)
    }

    pub fn write_completeness(&self, stations: &[StationCompleteness], path: &Path) -> Result<()> {
        self.write_rows(stations, path)
    }

    fn write_rows<T: Serialize>(&self, rows: &[T], path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(true)
            .buffer_capacity(self.buffer_capacity)
            .from_writer(temp);

        for row in rows {
            writer.serialize(row)?;
        }

        let mut temp = writer
            .into_inner()
            .map_err(|e| ProcessingError::Io(e.into_error()))?;
        temp.flush()?;
        temp.persist(path).map_err(|e| ProcessingError::Io(e.error))?;

        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_write_records_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let mut record = StationRecord::new(
            "USC00020001".to_string(),
            NaiveDate::from_ymd_opt(2015, 6, 1).unwrap(),
            33.5,
            -111.25,
            Some(340.0),
            Some("PHOENIX, AZ US".to_string()),
            Some(10.5),
            Some(",,7".to_string()),
        );
        record.sflag = "7".to_string();
        let missing = StationRecord::new(
            "USC00020001".to_string(),
            NaiveDate::from_ymd_opt(2015, 6, 2).unwrap(),
            33.5,
            -111.25,
            None,
            None,
            None,
            None,
        );

        CsvWriter::new().write_records(&[record, missing], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines,
            vec![
                "STATION,DATE,LATITUDE,LONGITUDE,ELEVATION,NAME,PRCP,PRCP_ATTRIBUTES,MFLAG,QFLAG,SFLAG",
                "USC00020001,2015-06-01,33.5,-111.25,340.0,\"PHOENIX, AZ US\",10.5,\",,7\",,,7",
                "USC00020001,2015-06-02,33.5,-111.25,,,,,,,",
            ]
        );
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");

        CsvWriter::new().write_records(&[], &path).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        assert!(path.exists());
    }

    #[test]
    fn test_write_completeness() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("completeness.csv");
        let stations = vec![StationCompleteness {
            station: "USC00020001".to_string(),
            latitude: 33.5,
            longitude: -111.25,
            n_obs: 3,
            mean_prcp: None,
            completeness: 75.0,
        }];

        CsvWriter::new().write_completeness(&stations, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "STATION,LATITUDE,LONGITUDE,N_OBS,MEAN_PRCP,COMPLETENESS\nUSC00020001,33.5,-111.25,3,,75.0\n"
        );
    }
}
