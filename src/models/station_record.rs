use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::constants::TRACE_MFLAGS;

/// One daily observation of a GHCN-Daily station after cleaning.
///
/// The serde field names match the merged CSV header, so the same type is
/// used to write the merged dataset and to read it back for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationRecord {
    #[serde(rename = "STATION")]
    pub station: String,

    #[serde(rename = "DATE")]
    pub date: NaiveDate,

    #[serde(rename = "LATITUDE")]
    pub latitude: f64,

    #[serde(rename = "LONGITUDE")]
    pub longitude: f64,

    #[serde(rename = "ELEVATION", default)]
    pub elevation: Option<f64>,

    #[serde(rename = "NAME", default)]
    pub name: Option<String>,

    /// Daily precipitation in millimetres, `None` when missing
    #[serde(rename = "PRCP", default)]
    pub prcp: Option<f64>,

    #[serde(rename = "PRCP_ATTRIBUTES", default)]
    pub prcp_attributes: Option<String>,

    #[serde(rename = "MFLAG", default)]
    pub mflag: String,

    #[serde(rename = "QFLAG", default)]
    pub qflag: String,

    #[serde(rename = "SFLAG", default)]
    pub sflag: String,
}

impl StationRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        station: String,
        date: NaiveDate,
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
        name: Option<String>,
        prcp: Option<f64>,
        prcp_attributes: Option<String>,
    ) -> Self {
        Self {
            station,
            date,
            latitude,
            longitude,
            elevation,
            name,
            prcp,
            prcp_attributes,
            mflag: String::new(),
            qflag: String::new(),
            sflag: String::new(),
        }
    }

    /// Trace amounts are recorded as zero in the cleaned dataset
    pub fn is_trace(&self) -> bool {
        TRACE_MFLAGS.contains(&self.mflag.as_str())
    }

    pub fn passed_quality_control(&self) -> bool {
        self.qflag.trim().is_empty()
    }

    pub fn has_precipitation(&self) -> bool {
        self.prcp.is_some_and(|p| !p.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(mflag: &str, qflag: &str) -> StationRecord {
        let mut record = StationRecord::new(
            "USC00020080".to_string(),
            NaiveDate::from_ymd_opt(2015, 3, 1).unwrap(),
            33.4484,
            -112.074,
            Some(331.0),
            Some("PHOENIX, AZ US".to_string()),
            Some(2.5),
            None,
        );
        record.mflag = mflag.to_string();
        record.qflag = qflag.to_string();
        record
    }

    #[test]
    fn test_trace_flags() {
        assert!(record("T", "").is_trace());
        assert!(record("S", "").is_trace());
        assert!(!record("", "").is_trace());
        assert!(!record("B", "").is_trace());
    }

    #[test]
    fn test_quality_control() {
        assert!(record("", "").passed_quality_control());
        assert!(record("", " ").passed_quality_control());
        assert!(!record("", "X").passed_quality_control());
    }

    #[test]
    fn test_has_precipitation() {
        let mut r = record("", "");
        assert!(r.has_precipitation());
        r.prcp = None;
        assert!(!r.has_precipitation());
        r.prcp = Some(f64::NAN);
        assert!(!r.has_precipitation());
    }
}
