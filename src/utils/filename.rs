use crate::models::DateRange;
use chrono::Datelike;
use std::path::{Path, PathBuf};

/// Generate default merged dataset filename: output/ghcn-precip-{START}-{END}.csv
pub fn generate_default_output_filename(date_range: &DateRange) -> PathBuf {
    let filename = format!(
        "ghcn-precip-{}-{}.csv",
        date_range.start.year(),
        date_range.end.year()
    );
    PathBuf::from("output").join(filename)
}

/// Generate the completeness report path next to the dataset it describes:
/// `data.csv` -> `data-completeness.csv`
pub fn generate_completeness_filename(dataset: &Path) -> PathBuf {
    let stem = dataset
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());

    dataset.with_file_name(format!("{}-completeness.csv", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_output_filename() {
        let range = DateRange::parse("2005-01-01", "2024-12-31").unwrap();
        let filename = generate_default_output_filename(&range);
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output"));
        assert!(filename_str.ends_with("ghcn-precip-2005-2024.csv"));
    }

    #[test]
    fn test_generate_completeness_filename() {
        let path = generate_completeness_filename(Path::new("out/ghcn-precip-2005-2024.csv"));
        assert_eq!(path, PathBuf::from("out/ghcn-precip-2005-2024-completeness.csv"));
    }
}
