//! Business calendar dates.
//!
//! Transactions carry calendar dates in the business timezone, while the remote
//! store keeps absolute instants. All conversion between the two goes through
//! [`DateNormalizer`], which uses a fixed UTC offset and never consults the
//! process timezone.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};

/// Offset of Brasília time, the default business timezone.
pub const DEFAULT_OFFSET_MINUTES: i32 = -180;

/// Converts between stored instants and business calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateNormalizer {
    offset: FixedOffset,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_OFFSET_MINUTES).unwrap_or_else(|| Self::new(Utc.fix()))
    }
}

impl DateNormalizer {
    /// Creates a normalizer for the given offset.
    #[must_use]
    pub const fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a normalizer from an offset in minutes east of UTC.
    ///
    /// Returns `None` when the offset is outside ±24 hours.
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(Self::new)
    }

    /// The business offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Calendar date of `instant` in the business timezone.
    #[must_use]
    pub fn to_calendar_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Instant stored for a calendar date: noon of that business day.
    ///
    /// Noon keeps the instant at least twelve hours away from either day
    /// boundary, so `to_calendar_date(to_storage_instant(d)) == d`.
    #[must_use]
    pub fn to_storage_instant(&self, date: NaiveDate) -> DateTime<Utc> {
        self.local_instant(date, NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN))
    }

    /// Half-open UTC interval `[start, end)` covering the business day `date`.
    #[must_use]
    pub fn day_bounds(&self, date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.local_instant(date, NaiveTime::MIN);
        let next = date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        let end = if next == date {
            DateTime::<Utc>::MAX_UTC
        } else {
            self.local_instant(next, NaiveTime::MIN)
        };
        (start, end)
    }

    /// Parses `YYYY-MM-DD` verbatim, or an RFC 3339 instant through the offset.
    #[must_use]
    pub fn parse_calendar_date(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Some(date);
        }
        DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|instant| self.to_calendar_date(instant.with_timezone(&Utc)))
    }

    /// Today's date in the business timezone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.to_calendar_date(Utc::now())
    }

    fn local_instant(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        // A fixed offset has no gaps or folds, so the mapping is always single.
        self.offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .map_or_else(|| date.and_time(time).and_utc(), |local| local.with_timezone(&Utc))
    }
}
