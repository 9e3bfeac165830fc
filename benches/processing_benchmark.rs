use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ghcn_preprocessor::models::{KeepSet, StationRecord};
use ghcn_preprocessor::processors::{split_flags, DataMerger, PartialTable, RecordFilter};
use ghcn_preprocessor::readers::RawObservation;

const ATTRIBUTES: [&str; 6] = [",,7", "T,,7", ",X,7", "S,,N", "P,,7", ""];

// Create test data for benchmarking
fn create_observations(station_id: usize, days: usize) -> Vec<RawObservation> {
    let base_date = NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();

    (0..days)
        .map(|day| RawObservation {
            station: format!("USC{:08}", station_id),
            date: base_date + chrono::Duration::days(day as i64),
            latitude: 33.0 + station_id as f64 * 0.01,
            longitude: -111.0,
            elevation: Some(340.0),
            name: Some(format!("Test Station {}", station_id)),
            prcp: Some(((day * 7) % 300).to_string()),
            prcp_attributes: Some(ATTRIBUTES[day % ATTRIBUTES.len()].to_string()),
        })
        .collect()
}

fn create_partials(station_count: usize, days: usize) -> Vec<PartialTable> {
    let filter = RecordFilter::new(KeepSet::standard());

    // Reverse order mimics out-of-order completion
    (0..station_count)
        .rev()
        .map(|i| PartialTable::new(i, filter.filter(create_observations(i, days))))
        .collect()
}

fn benchmark_flag_splitter(c: &mut Criterion) {
    c.bench_function("flag_splitter", |b| {
        b.iter(|| {
            let mut blank = 0;
            for attributes in &ATTRIBUTES {
                if split_flags(black_box(Some(*attributes))).qflag.is_empty() {
                    blank += 1;
                }
            }
            black_box(blank)
        })
    });
}

fn benchmark_record_filter(c: &mut Criterion) {
    let observations = create_observations(1, 5_000);
    let filter = RecordFilter::new(KeepSet::standard());

    c.bench_function("record_filter", |b| {
        b.iter(|| {
            let records: Vec<StationRecord> = filter.filter(observations.clone());
            black_box(records.len())
        })
    });
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("data_merger_by_size");

    for &size in &[10, 50, 100, 500] {
        group.bench_with_input(
            BenchmarkId::new("stations", size),
            &size,
            |b, &station_count| {
                let partials = create_partials(station_count, 365);

                b.iter(|| {
                    let merged = DataMerger::new().merge(partials.clone());
                    black_box(merged.len())
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_flag_splitter,
    benchmark_record_filter,
    benchmark_varying_data_sizes
);
criterion_main!(benches);
