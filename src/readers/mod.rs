pub mod dataset_reader;
pub mod station_reader;

pub use dataset_reader::DatasetReader;
pub use station_reader::{parse_observation_date, ObservationIterator, RawObservation, StationReader};
