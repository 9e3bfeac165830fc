/// Input column names
pub const COL_STATION: &str = "STATION";
pub const COL_DATE: &str = "DATE";
pub const COL_LATITUDE: &str = "LATITUDE";
pub const COL_LONGITUDE: &str = "LONGITUDE";
pub const COL_PRCP: &str = "PRCP";
pub const COL_PRCP_ATTRIBUTES: &str = "PRCP_ATTRIBUTES";

/// Columns every station file must provide
pub const REQUIRED_COLUMNS: [&str; 5] = [COL_STATION, COL_DATE, COL_LATITUDE, COL_LONGITUDE, COL_PRCP];

/// Station files are discovered by this extension
pub const STATION_FILE_EXTENSION: &str = "csv";

/// GHCN-Daily stores precipitation in tenths of a millimetre
pub const PRCP_TENTHS_PER_MM: f64 = 10.0;

/// Measurement flags denoting a trace amount
pub const TRACE_MFLAGS: [&str; 2] = ["S", "T"];

/// MFLAG keep-set presets
pub const STANDARD_KEEP_MFLAGS: [&str; 8] = ["", "G", "B", "N", "S", "T", "A", "E"];
pub const CONSERVATIVE_KEEP_MFLAGS: [&str; 6] = ["", "G", "B", "N", "S", "T"];
pub const BLANK_FLAG_TOKEN: &str = "blank";

/// CoCoRaHS station IDs share this prefix
pub const COCORAHS_PREFIX: &str = "US1";

/// Processing defaults
pub const DEFAULT_START_DATE: &str = "2010-01-01";
pub const DEFAULT_END_DATE: &str = "2024-12-31";
pub const DEFAULT_PROGRESS_INTERVAL: usize = 200;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
pub const DEFAULT_COMPLETENESS_THRESHOLD: f64 = 80.0;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "GHCN";
