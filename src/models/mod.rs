pub mod keep_set;
pub mod region;
pub mod station_record;

pub use keep_set::KeepSet;
pub use region::{BoundingBox, DateRange};
pub use station_record::StationRecord;
