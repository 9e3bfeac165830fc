use crate::models::{KeepSet, StationRecord};
use crate::processors::flag_splitter::split_flags;
use crate::readers::RawObservation;
use crate::utils::constants::PRCP_TENTHS_PER_MM;

/// Row counts produced while filtering one station's observations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub input_rows: usize,
    pub kept_rows: usize,
    pub missing_prcp: usize,
    pub rejected_mflag: usize,
    pub rejected_qflag: usize,
    pub trace_zeroed: usize,
}

/// Flag-based admission and unit conversion for rows of a single station
pub struct RecordFilter {
    keep_mflags: KeepSet,
}

impl RecordFilter {
    pub fn new(keep_mflags: KeepSet) -> Self {
        Self { keep_mflags }
    }

    pub fn filter(&self, rows: Vec<RawObservation>) -> Vec<StationRecord> {
        self.filter_with_stats(rows).0
    }

    /// Coerce and convert PRCP, split the flags, drop rows whose MFLAG is not
    /// kept or whose QFLAG is set, then zero trace amounts.
    pub fn filter_with_stats(&self, rows: Vec<RawObservation>) -> (Vec<StationRecord>, FilterStats) {
        let mut stats = FilterStats {
            input_rows: rows.len(),
            ..Default::default()
        };
        let mut kept = Vec::with_capacity(rows.len());

        for row in rows {
            let prcp = coerce_prcp(row.prcp.as_deref()).map(|tenths| tenths / PRCP_TENTHS_PER_MM);
            let flags = split_flags(row.prcp_attributes.as_deref());

            let mut record = StationRecord::new(
                row.station,
                row.date,
                row.latitude,
                row.longitude,
                row.elevation,
                row.name,
                prcp,
                row.prcp_attributes,
            );
            record.mflag = flags.mflag;
            record.qflag = flags.qflag;
            record.sflag = flags.sflag;

            if !self.keep_mflags.contains(&record.mflag) {
                stats.rejected_mflag += 1;
                continue;
            }

            if !record.passed_quality_control() {
                stats.rejected_qflag += 1;
                continue;
            }

            if record.is_trace() {
                record.prcp = Some(0.0);
                stats.trace_zeroed += 1;
            }

            if record.prcp.is_none() {
                stats.missing_prcp += 1;
            }

            kept.push(record);
        }

        stats.kept_rows = kept.len();
        (kept, stats)
    }
}

/// Lenient numeric parse: blanks and non-numeric text become missing
pub fn coerce_prcp(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate};

    fn raw(day: u32, prcp: Option<&str>, attributes: Option<&str>) -> RawObservation {
        RawObservation {
            station: "USC00021026".to_string(),
            date: NaiveDate::from_ymd_opt(2012, 7, day).unwrap(),
            latitude: 32.2,
            longitude: -110.9,
            elevation: Some(728.5),
            name: Some("TUCSON, AZ US".to_string()),
            prcp: prcp.map(str::to_string),
            prcp_attributes: attributes.map(str::to_string),
        }
    }

    #[test]
    fn test_coerce_prcp() {
        assert_eq!(coerce_prcp(Some("105")), Some(105.0));
        assert_eq!(coerce_prcp(Some(" 3 ")), Some(3.0));
        assert_eq!(coerce_prcp(Some("")), None);
        assert_eq!(coerce_prcp(Some("abc")), None);
        assert_eq!(coerce_prcp(None), None);
    }

    #[test]
    fn test_unit_conversion() {
        let filter = RecordFilter::new(KeepSet::standard());
        let records = filter.filter(vec![raw(1, Some("105"), Some(",,7"))]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prcp, Some(10.5));
    }

    #[test]
    fn test_failed_quality_control_is_rejected() {
        let filter = RecordFilter::new(KeepSet::standard());
        let records = filter.filter(vec![
            raw(1, Some("10"), Some(",I,7")),
            raw(2, Some("10"), Some("T,X,7")),
            raw(3, Some("10"), Some(",,7")),
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date.day(), 3);
        assert!(records.iter().all(|r| r.qflag.is_empty()));
    }

    #[test]
    fn test_mflag_keep_set() {
        let filter = RecordFilter::new(KeepSet::conservative());
        let (records, stats) = filter.filter_with_stats(vec![
            raw(1, Some("10"), Some("A,,7")),
            raw(2, Some("10"), Some("P,,7")),
            raw(3, Some("10"), Some("B,,7")),
        ]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mflag, "B");
        assert_eq!(stats.rejected_mflag, 2);
    }

    #[test]
    fn test_blank_mflag_requires_blank_in_keep_set() {
        let filter = RecordFilter::new(KeepSet::parse("B,S,T"));
        let records = filter.filter(vec![raw(1, Some("10"), Some(",,7"))]);
        assert!(records.is_empty());
    }

    #[test]
    fn test_trace_override() {
        let filter = RecordFilter::new(KeepSet::standard());
        let (records, stats) = filter.filter_with_stats(vec![
            raw(1, Some("3"), Some("T,,7")),
            raw(2, Some(""), Some("S,,7")),
            raw(3, Some("bad"), Some("T,,7")),
        ]);

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.prcp == Some(0.0)));
        assert_eq!(stats.trace_zeroed, 3);
        assert_eq!(stats.missing_prcp, 0);
    }

    #[test]
    fn test_source_flag_only_passes_unchanged() {
        let filter = RecordFilter::new(KeepSet::standard());
        let records = filter.filter(vec![raw(1, Some("42"), Some(",,X"))]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].mflag, "");
        assert_eq!(records[0].qflag, "");
        assert_eq!(records[0].sflag, "X");
        assert_eq!(records[0].prcp, Some(4.2));
    }

    #[test]
    fn test_missing_prcp_is_kept_as_missing() {
        let filter = RecordFilter::new(KeepSet::standard());
        let (records, stats) = filter.filter_with_stats(vec![raw(1, Some("n/a"), None)]);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prcp, None);
        assert_eq!(stats.missing_prcp, 1);
    }
}
