use crate::error::{ProcessingError, Result};
use crate::utils::constants::{DEFAULT_BUFFER_SIZE, REQUIRED_COLUMNS};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One parsed row of a GHCN-Daily station CSV, before any cleaning.
///
/// PRCP is kept as the raw cell text so that coercion stays a filtering step.
#[derive(Debug, Clone, PartialEq)]
pub struct RawObservation {
    pub station: String,
    pub date: NaiveDate,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: Option<f64>,
    pub name: Option<String>,
    pub prcp: Option<String>,
    pub prcp_attributes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StationRow {
    #[serde(rename = "STATION")]
    station: String,

    #[serde(rename = "DATE")]
    date: String,

    #[serde(rename = "LATITUDE")]
    latitude: f64,

    #[serde(rename = "LONGITUDE")]
    longitude: f64,

    #[serde(rename = "ELEVATION", default, deserialize_with = "csv::invalid_option")]
    elevation: Option<f64>,

    #[serde(rename = "NAME", default)]
    name: Option<String>,

    #[serde(rename = "PRCP", default)]
    prcp: Option<String>,

    #[serde(rename = "PRCP_ATTRIBUTES", default)]
    prcp_attributes: Option<String>,
}

impl StationRow {
    fn into_observation(self) -> Result<RawObservation> {
        Ok(RawObservation {
            date: parse_observation_date(&self.date)?,
            station: self.station,
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: self.elevation,
            name: self.name,
            prcp: self.prcp,
            prcp_attributes: self.prcp_attributes,
        })
    }
}

/// Parse an ISO date, truncating an ISO datetime to its calendar day
pub fn parse_observation_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }

    Err(ProcessingError::InvalidFormat(format!(
        "Invalid date format: '{}'",
        value
    )))
}

/// Reader for per-station GHCN-Daily CSV files
pub struct StationReader {
    buffer_capacity: usize,
}

impl StationReader {
    pub fn new() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_capacity(buffer_capacity: usize) -> Self {
        Self { buffer_capacity }
    }

    /// Read every observation of a station file into memory
    pub fn read_observations(&self, path: &Path) -> Result<Vec<RawObservation>> {
        self.stream_observations(path)?.collect()
    }

    /// Stream observations from a station file.
    ///
    /// The header is checked for the required columns before the first row is
    /// returned.
    pub fn stream_observations(&self, path: &Path) -> Result<ObservationIterator<File>> {
        let file = File::open(path)?;
        self.stream_from_reader(file)
    }

    pub fn stream_from_reader<R: Read>(&self, rdr: R) -> Result<ObservationIterator<R>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .buffer_capacity(self.buffer_capacity)
            .from_reader(rdr);

        let headers = reader.headers()?;
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ProcessingError::MissingColumn(column.to_string()));
            }
        }

        Ok(ObservationIterator {
            rows: reader.into_deserialize(),
        })
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the rows of one station file
pub struct ObservationIterator<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, StationRow>,
}

impl<R: Read> Iterator for ObservationIterator<R> {
    type Item = Result<RawObservation>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| {
            row.map_err(ProcessingError::from)
                .and_then(StationRow::into_observation)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "\"STATION\",\"DATE\",\"LATITUDE\",\"LONGITUDE\",\"ELEVATION\",\"NAME\",\"PRCP\",\"PRCP_ATTRIBUTES\"";

    #[test]
    fn test_parse_observation_date() {
        let expected = NaiveDate::from_ymd_opt(2015, 6, 30).unwrap();
        assert_eq!(parse_observation_date("2015-06-30").unwrap(), expected);
        assert_eq!(parse_observation_date("2015-06-30T00:00:00").unwrap(), expected);
        assert_eq!(parse_observation_date(" 2015-06-30 ").unwrap(), expected);
        assert!(parse_observation_date("30/06/2015").is_err());
    }

    #[test]
    fn test_read_station_file() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "{}", HEADER)?;
        writeln!(
            temp_file,
            "\"USC00020080\",\"2015-01-01\",\"33.4484\",\"-112.074\",\"331.0\",\"PHOENIX, AZ US\",\"105\",\",,7,0700\""
        )?;
        writeln!(
            temp_file,
            "\"USC00020080\",\"2015-01-02\",\"33.4484\",\"-112.074\",\"331.0\",\"PHOENIX, AZ US\",\"\",\"\""
        )?;

        let reader = StationReader::new();
        let rows = reader.read_observations(temp_file.path())?;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].station, "USC00020080");
        assert_eq!(rows[0].name.as_deref(), Some("PHOENIX, AZ US"));
        assert_eq!(rows[0].prcp.as_deref(), Some("105"));
        assert_eq!(rows[0].prcp_attributes.as_deref(), Some(",,7,0700"));
        assert_eq!(rows[0].elevation, Some(331.0));
        assert_eq!(rows[1].prcp, None);
        assert_eq!(rows[1].prcp_attributes, None);

        Ok(())
    }

    #[test]
    fn test_optional_columns_may_be_absent() -> Result<()> {
        let data = "STATION,DATE,LATITUDE,LONGITUDE,PRCP\nUSW00023183,2020-02-01,33.43,-112.0,3\n";
        let reader = StationReader::new();
        let rows: Vec<RawObservation> = reader
            .stream_from_reader(data.as_bytes())?
            .collect::<Result<_>>()?;

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].elevation, None);
        assert_eq!(rows[0].name, None);
        assert_eq!(rows[0].prcp_attributes, None);

        Ok(())
    }

    #[test]
    fn test_unparseable_elevation_is_missing() -> Result<()> {
        let data = "STATION,DATE,LATITUDE,LONGITUDE,ELEVATION,PRCP\nUSW00023183,2020-02-01,33.43,-112.0,unknown,3\n";
        let rows: Vec<RawObservation> = StationReader::new()
            .stream_from_reader(data.as_bytes())?
            .collect::<Result<_>>()?;

        assert_eq!(rows[0].elevation, None);
        Ok(())
    }

    #[test]
    fn test_missing_required_column() {
        let data = "STATION,DATE,LATITUDE,PRCP\nUSW00023183,2020-02-01,33.43,3\n";
        let result = StationReader::new().stream_from_reader(data.as_bytes());

        match result {
            Err(ProcessingError::MissingColumn(column)) => assert_eq!(column, "LONGITUDE"),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected a missing column error"),
        }
    }

    #[test]
    fn test_header_names_must_match_exactly() {
        let data = "STATION, DATE,LATITUDE,LONGITUDE,PRCP\nUSW00023183,2020-02-01,33.43,-112.0,3\n";
        let result = StationReader::new().stream_from_reader(data.as_bytes());

        assert!(matches!(result, Err(ProcessingError::MissingColumn(column)) if column == "DATE"));
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let data = "STATION,DATE,LATITUDE,LONGITUDE,PRCP\nUSW00023183,not-a-date,33.43,-112.0,3\n";
        let rows: Result<Vec<RawObservation>> = StationReader::new()
            .stream_from_reader(data.as_bytes())
            .and_then(|it| it.collect());

        assert!(rows.is_err());
    }
}
