use crate::error::{ProcessingError, Result};
use crate::models::StationRecord;
use crate::readers::DatasetReader;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Distribution of the non-missing PRCP values, in millimetres
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrcpDistribution {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; undefined below two values
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl PrcpDistribution {
    pub fn from_values(mut values: Vec<f64>) -> Self {
        values.retain(|v| !v.is_nan());
        values.sort_by(f64::total_cmp);

        let count = values.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                std: None,
                min: None,
                p25: None,
                median: None,
                p75: None,
                max: None,
            };
        }

        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            Some((ss / (count - 1) as f64).sqrt())
        } else {
            None
        };

        Self {
            count,
            mean: Some(mean),
            std,
            min: values.first().copied(),
            p25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            p75: quantile(&values, 0.75),
            max: values.last().copied(),
        }
    }
}

/// Linear interpolation between the closest ranks of sorted values
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub unique_stations: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub prcp: PrcpDistribution,
}

pub struct PrecipitationAnalyzer;

impl PrecipitationAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_file(&self, path: &Path) -> Result<DatasetSummary> {
        let records = DatasetReader::new().read_records(path)?;
        self.analyze(&records)
    }

    pub fn analyze(&self, records: &[StationRecord]) -> Result<DatasetSummary> {
        let first = records.first().ok_or(ProcessingError::EmptyFile)?;

        let mut stations = HashSet::new();
        let mut first_date = first.date;
        let mut last_date = first.date;
        let mut values = Vec::with_capacity(records.len());

        for record in records {
            stations.insert(record.station.as_str());
            first_date = first_date.min(record.date);
            last_date = last_date.max(record.date);
            if let Some(prcp) = record.prcp {
                values.push(prcp);
            }
        }

        Ok(DatasetSummary {
            total_records: records.len(),
            unique_stations: stations.len(),
            first_date,
            last_date,
            prcp: PrcpDistribution::from_values(values),
        })
    }
}

impl Default for PrecipitationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn fmt_stat(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "NaN".to_string())
}

impl DatasetSummary {
    pub fn summary(&self) -> String {
        format!(
            "Records: {} total\n\
            Stations: {} stations\n\
            Date Range: {} to {}",
            self.total_records, self.unique_stations, self.first_date, self.last_date
        )
    }

    pub fn detailed_summary(&self) -> String {
        let p = &self.prcp;
        format!(
            "{}\n\n\
            PRCP (mm):\n\
            count  {}\n\
            mean   {}\n\
            std    {}\n\
            min    {}\n\
            25%    {}\n\
            50%    {}\n\
            75%    {}\n\
            max    {}",
            self.summary(),
            p.count,
            fmt_stat(p.mean),
            fmt_stat(p.std),
            fmt_stat(p.min),
            fmt_stat(p.p25),
            fmt_stat(p.median),
            fmt_stat(p.p75),
            fmt_stat(p.max)
        )
    }
}
