use crate::models::{DateRange, StationRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Observation coverage of one station over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationCompleteness {
    #[serde(rename = "STATION")]
    pub station: String,

    #[serde(rename = "LATITUDE")]
    pub latitude: f64,

    #[serde(rename = "LONGITUDE")]
    pub longitude: f64,

    /// Days with a non-missing PRCP value
    #[serde(rename = "N_OBS")]
    pub n_obs: usize,

    #[serde(rename = "MEAN_PRCP")]
    pub mean_prcp: Option<f64>,

    /// Percent of the days in the range that were observed
    #[serde(rename = "COMPLETENESS")]
    pub completeness: f64,
}

#[derive(Default)]
struct Accumulator {
    latitude: f64,
    longitude: f64,
    n_obs: usize,
    prcp_sum: f64,
}

pub struct CompletenessAnalyzer {
    date_range: DateRange,
}

impl CompletenessAnalyzer {
    pub fn new(date_range: DateRange) -> Self {
        Self { date_range }
    }

    /// One entry per station, sorted by station ID. Location is taken from
    /// the station's first record.
    pub fn compute(&self, records: &[StationRecord]) -> Vec<StationCompleteness> {
        let mut stations: BTreeMap<&str, Accumulator> = BTreeMap::new();

        for record in records {
            let acc = stations
                .entry(record.station.as_str())
                .or_insert_with(|| Accumulator {
                    latitude: record.latitude,
                    longitude: record.longitude,
                    ..Default::default()
                });

            if record.has_precipitation() {
                if let Some(prcp) = record.prcp {
                    acc.n_obs += 1;
                    acc.prcp_sum += prcp;
                }
            }
        }

        let n_days = self.date_range.num_days() as f64;

        stations
            .into_iter()
            .map(|(station, acc)| StationCompleteness {
                station: station.to_string(),
                latitude: acc.latitude,
                longitude: acc.longitude,
                n_obs: acc.n_obs,
                mean_prcp: (acc.n_obs > 0).then(|| acc.prcp_sum / acc.n_obs as f64),
                completeness: acc.n_obs as f64 / n_days * 100.0,
            })
            .collect()
    }

    /// Stations at or above `threshold` percent
    pub fn filter_by_threshold(
        stations: Vec<StationCompleteness>,
        threshold: f64,
    ) -> Vec<StationCompleteness> {
        stations
            .into_iter()
            .filter(|s| s.completeness >= threshold)
            .collect()
    }
}
