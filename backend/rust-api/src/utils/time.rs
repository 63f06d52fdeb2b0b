use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use lazy_static::lazy_static;
use mongodb::bson::DateTime as BsonDateTime;
use regex::Regex;

use crate::errors::ApiError;

/// Wire format for calendar dates: `YYYY-MM-DD`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Wire format for times of day: `HH:MM`, 24-hour.
pub const TIME_FORMAT: &str = "%H:%M";

/// All exam timing runs in one fixed offset so comparisons are unambiguous.
/// Default is +05:30; deployments override via config.
pub const DEFAULT_TZ_OFFSET_MINUTES: i32 = 330;

lazy_static! {
    // chrono accepts single-digit fields; the boundary format does not
    static ref DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref TIME_RE: Regex = Regex::new(r"^\d{2}:\d{2}$").unwrap();
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    if !DATE_RE.is_match(raw) {
        return Err(ApiError::Format(format!(
            "Invalid date '{raw}', expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ApiError::Format(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn parse_time(raw: &str) -> Result<NaiveTime, ApiError> {
    if !TIME_RE.is_match(raw) {
        return Err(ApiError::Format(format!(
            "Invalid time '{raw}', expected HH:MM (24-hour)"
        )));
    }
    NaiveTime::parse_from_str(raw, TIME_FORMAT)
        .map_err(|_| ApiError::Format(format!("Invalid time '{raw}', expected HH:MM (24-hour)")))
}

/// Combine boundary date and time strings into an instant in the system offset.
pub fn combine_date_time(
    date: &str,
    time: &str,
    offset: FixedOffset,
) -> Result<DateTime<FixedOffset>, ApiError> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    date.and_time(time)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| ApiError::Format("Date/time is not representable in the system offset".into()))
}

pub fn chrono_to_bson(dt: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(dt.timestamp_millis())
}

/// Source of "now" for every timing decision. Real deployments read the wall
/// clock in the configured offset; tests pin an instant.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset: FixedOffset,
    fixed: Option<DateTime<FixedOffset>>,
}

impl Clock {
    pub fn with_offset_minutes(minutes: i32) -> Result<Self, ApiError> {
        let offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            ApiError::Format(format!("Invalid timezone offset of {minutes} minutes"))
        })?;
        Ok(Self { offset, fixed: None })
    }

    /// Clock that always reports the given instant.
    pub fn fixed_at(instant: DateTime<FixedOffset>) -> Self {
        Self {
            offset: *instant.offset(),
            fixed: Some(instant),
        }
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.fixed
            .unwrap_or_else(|| Utc::now().with_timezone(&self.offset))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_date_and_time() {
        assert!(parse_date("2025-06-01").is_ok());
        assert!(parse_time("09:30").is_ok());
    }

    #[test]
    fn rejects_loose_formats() {
        assert!(parse_date("2025-6-1").is_err());
        assert!(parse_date("01-06-2025").is_err());
        assert!(parse_time("9:30").is_err());
        assert!(parse_time("09:30:00").is_err());
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn combines_in_the_requested_offset() {
        let offset = FixedOffset::east_opt(330 * 60).unwrap();
        let dt = combine_date_time("2025-06-01", "10:00", offset).unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-06-01T10:00:00+05:30");
    }

    #[test]
    fn fixed_clock_reports_pinned_instant() {
        let offset = FixedOffset::east_opt(330 * 60).unwrap();
        let instant = combine_date_time("2025-06-01", "10:00", offset).unwrap();
        let clock = Clock::fixed_at(instant);
        assert_eq!(clock.now(), instant);
    }
}
