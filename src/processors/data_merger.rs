use crate::models::StationRecord;
use std::cmp::Ordering;

/// A file's filtered rows tagged with the file's position in the sorted
/// directory listing
#[derive(Debug, Clone)]
pub struct PartialTable {
    pub file_index: usize,
    pub records: Vec<StationRecord>,
}

impl PartialTable {
    pub fn new(file_index: usize, records: Vec<StationRecord>) -> Self {
        Self {
            file_index,
            records,
        }
    }
}

pub struct DataMerger;

impl DataMerger {
    pub fn new() -> Self {
        Self
    }

    /// Concatenate partial tables and sort by station ID and date.
    ///
    /// Partials arrive in completion order. They are laid out by file index
    /// before the stable sort, so rows sharing a (station, date) key keep the
    /// listing order and the result never depends on worker timing.
    pub fn merge(&self, mut partials: Vec<PartialTable>) -> Vec<StationRecord> {
        partials.sort_by_key(|p| p.file_index);

        let total: usize = partials.iter().map(|p| p.records.len()).sum();
        let mut merged = Vec::with_capacity(total);
        for partial in partials {
            merged.extend(partial.records);
        }

        merged.sort_by(compare_station_date);
        merged
    }
}

impl Default for DataMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordering of the merged dataset: station ID, then date
pub fn compare_station_date(a: &StationRecord, b: &StationRecord) -> Ordering {
    a.station
        .cmp(&b.station)
        .then_with(|| a.date.cmp(&b.date))
}

/// True when every adjacent pair is non-decreasing by (station, date)
pub fn is_sorted_by_station_date(records: &[StationRecord]) -> bool {
    records
        .windows(2)
        .all(|pair| compare_station_date(&pair[0], &pair[1]) != Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(station: &str, day: u32, prcp: f64) -> StationRecord {
        StationRecord::new(
            station.to_string(),
            NaiveDate::from_ymd_opt(2020, 1, day).unwrap(),
            33.0,
            -111.0,
            None,
            None,
            Some(prcp),
            None,
        )
    }

    #[test]
    fn test_merge_sorts_by_station_and_date() {
        let partials = vec![
            PartialTable::new(1, vec![record("USW00003", 2, 1.0), record("USW00003", 1, 2.0)]),
            PartialTable::new(0, vec![record("USC00001", 5, 3.0)]),
            PartialTable::new(2, vec![record("USC00002", 1, 4.0)]),
        ];

        let merged = DataMerger::new().merge(partials);

        let keys: Vec<(&str, u32)> = merged
            .iter()
            .map(|r| (r.station.as_str(), chrono::Datelike::day(&r.date)))
            .collect();
        assert_eq!(
            keys,
            vec![("USC00001", 5), ("USC00002", 1), ("USW00003", 1), ("USW00003", 2)]
        );
        assert!(is_sorted_by_station_date(&merged));
    }

    #[test]
    fn test_duplicate_keys_follow_file_order() {
        // Same station/date in two files; completion order is reversed
        let late = PartialTable::new(1, vec![record("USC00001", 1, 9.0)]);
        let early = PartialTable::new(0, vec![record("USC00001", 1, 1.0)]);

        let a = DataMerger::new().merge(vec![late.clone(), early.clone()]);
        let b = DataMerger::new().merge(vec![early, late]);

        assert_eq!(a, b);
        assert_eq!(a[0].prcp, Some(1.0));
        assert_eq!(a[1].prcp, Some(9.0));
    }

    #[test]
    fn test_merge_empty() {
        assert!(DataMerger::new().merge(Vec::new()).is_empty());
    }
}
