use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Inclusive latitude/longitude rectangle used to admit station files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_bounding_box"))]
pub struct BoundingBox {
    #[validate(range(min = -90.0, max = 90.0))]
    pub min_lat: f64,

    #[validate(range(min = -90.0, max = 90.0))]
    pub max_lat: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub min_lon: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// All four bounds are inclusive. NaN coordinates are never contained.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&latitude)
            && (self.min_lon..=self.max_lon).contains(&longitude)
    }
}

fn validate_bounding_box(bbox: &BoundingBox) -> std::result::Result<(), ValidationError> {
    if bbox.min_lat > bbox.max_lat {
        let mut err = ValidationError::new("min_lat_exceeds_max_lat");
        err.message = Some(
            format!(
                "min_lat {} is greater than max_lat {}",
                bbox.min_lat, bbox.max_lat
            )
            .into(),
        );
        return Err(err);
    }

    if bbox.min_lon > bbox.max_lon {
        let mut err = ValidationError::new("min_lon_exceeds_max_lon");
        err.message = Some(
            format!(
                "min_lon {} is greater than max_lon {}",
                bbox.min_lon, bbox.max_lon
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Build a range from ISO `YYYY-MM-DD` strings
    pub fn parse(start: &str, end: &str) -> crate::error::Result<Self> {
        Ok(Self {
            start: NaiveDate::parse_from_str(start.trim(), "%Y-%m-%d")?,
            end: NaiveDate::parse_from_str(end.trim(), "%Y-%m-%d")?,
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    /// Number of calendar days covered, both ends included
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn validate_date_range(range: &DateRange) -> std::result::Result<(), ValidationError> {
    if range.start > range.end {
        let mut err = ValidationError::new("start_after_end");
        err.message = Some(format!("start {} is after end {}", range.start, range.end).into());
        return Err(err);
    }
    Ok(())
}
