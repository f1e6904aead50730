//! Defines the time window sent to Frost and the bucket granularity observations are
//! aggregated into.

use chrono::{
    DateTime, Datelike, NaiveDate, NaiveTime, SecondsFormat, TimeDelta, TimeZone, Timelike, Utc,
    Weekday,
};
use std::fmt;

/// A closed time window in UTC, serialized for Frost as `from/to` ISO-8601 instants.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use frost_climate::TimeRange;
///
/// let range = TimeRange::new(
///     Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap(),
/// );
/// assert_eq!(range.to_interval_string(), "2020-01-01T00:00:00Z/2021-01-01T00:00:00Z");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Everything Frost has: 1800-01-01T00:00Z up to now. The default for climate profiles.
    pub fn all_time() -> Self {
        let from = Utc
            .with_ymd_and_hms(1800, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self::new(from, Utc::now())
    }

    /// The start of the current UTC year up to now. The default for nearest-window fetches.
    pub fn current_year() -> Self {
        let now = Utc::now();
        let from = Utc
            .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
            .single()
            .unwrap_or(now);
        Self::new(from, now)
    }

    /// Formats the range as Frost expects it in `time` / `referencetime` parameters.
    pub fn to_interval_string(&self) -> String {
        format!("{}/{}", format_instant(&self.from), format_instant(&self.to))
    }
}

pub(crate) fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::all_time()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_interval_string())
    }
}

/// The granularity observations are bucketed into before averaging.
///
/// Buckets are 1-based. A station is considered complete for an interval once it has at least
/// one observation in every bucket the queried time range can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeInterval {
    /// Minute of the hour, 60 buckets.
    Minute,
    /// Hour of the day, 24 buckets.
    Hour,
    /// Day of the month, 31 buckets.
    Day,
    /// ISO week of the year, 53 buckets. Week 53 only exists in some ISO years.
    Week,
    /// Month of the year, 12 buckets. Climate profiles always use this.
    Month,
}

impl TimeInterval {
    /// Number of buckets a complete series has.
    pub fn bucket_count(&self) -> usize {
        match self {
            TimeInterval::Minute => 60,
            TimeInterval::Hour => 24,
            TimeInterval::Day => 31,
            TimeInterval::Week => 53,
            TimeInterval::Month => 12,
        }
    }

    /// Number of buckets a series over `range` can fill. Weeks count 52 unless an ISO week 53
    /// overlaps the range.
    pub fn bucket_count_within(&self, range: &TimeRange) -> usize {
        match self {
            TimeInterval::Week if !covers_week_53(range) => 52,
            _ => self.bucket_count(),
        }
    }

    /// The 1-based bucket `instant` falls into.
    pub fn bucket(&self, instant: &DateTime<Utc>) -> u32 {
        match self {
            TimeInterval::Minute => instant.minute() + 1,
            TimeInterval::Hour => instant.hour() + 1,
            TimeInterval::Day => instant.day(),
            TimeInterval::Week => instant.iso_week().week(),
            TimeInterval::Month => instant.month(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            TimeInterval::Minute => "minute",
            TimeInterval::Hour => "hour",
            TimeInterval::Day => "day",
            TimeInterval::Week => "week",
            TimeInterval::Month => "month",
        }
    }
}

fn covers_week_53(range: &TimeRange) -> bool {
    (range.from.iso_week().year()..=range.to.iso_week().year()).any(|year| {
        NaiveDate::from_isoywd_opt(year, 53, Weekday::Mon).is_some_and(|monday| {
            let start = monday.and_time(NaiveTime::MIN).and_utc();
            start <= range.to && start + TimeDelta::days(7) > range.from
        })
    })
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
