//! Period resolution into concrete intervals.

use chrono::offset::LocalResult;
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::error::PeriodError;
use super::token::{PeriodKind, PeriodToken};

/// A half-open `[start, end)` interval of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateInterval {
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl DateInterval {
    /// Creates an interval.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns true if `at` falls inside the interval.
    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    /// Length of the interval.
    #[must_use]
    pub fn length(&self) -> Duration {
        self.end - self.start
    }

    /// The interval of identical length ending where this one starts.
    #[must_use]
    pub fn preceding(&self) -> Self {
        Self {
            start: self.start - self.length(),
            end: self.start,
        }
    }
}

/// A period token resolved against a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPeriod {
    /// Token that was resolved.
    pub token: PeriodToken,
    /// Rolling or calendar.
    pub kind: PeriodKind,
    /// The requested interval.
    pub current: DateInterval,
    /// Comparison interval immediately before `current`.
    pub previous: DateInterval,
}

/// Resolves period tokens in a business timezone.
#[derive(Debug, Clone, Copy)]
pub struct PeriodResolver {
    tz: Tz,
}

impl PeriodResolver {
    /// Creates a resolver for the given timezone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Business timezone.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Local calendar date of an instant.
    #[must_use]
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    /// Resolves `token` at `now`, including the comparison interval.
    ///
    /// # Errors
    ///
    /// Returns an error if a calendar boundary cannot be represented.
    pub fn resolve(&self, token: PeriodToken, now: DateTime<Utc>) -> Result<ResolvedPeriod, PeriodError> {
        let current = self.interval(token, now)?;
        Ok(ResolvedPeriod {
            token,
            kind: token.kind(),
            current,
            previous: current.preceding(),
        })
    }

    /// Resolves `token` at `now` to its interval.
    ///
    /// Rolling tokens end at `now`. Calendar tokens span whole local months
    /// or years: `current_month` and `current_year` end at the next boundary,
    /// the `last_*` tokens end at the start of the current month.
    ///
    /// # Errors
    ///
    /// Returns an error if a calendar boundary cannot be represented.
    pub fn interval(&self, token: PeriodToken, now: DateTime<Utc>) -> Result<DateInterval, PeriodError> {
        let today = self.local_date(now);
        let this_month = first_of_month(today.year(), today.month())?;

        let (start, end) = match token {
            PeriodToken::Last7Days
            | PeriodToken::Last30Days
            | PeriodToken::Last90Days
            | PeriodToken::LastYear => {
                let days = token.rolling_days().ok_or(PeriodError::OutOfRange)?;
                return Ok(DateInterval::new(now - Duration::days(days), now));
            }
            PeriodToken::CurrentMonth => (this_month, shift_months(this_month, 1)?),
            PeriodToken::LastMonth => (shift_months(this_month, -1)?, this_month),
            PeriodToken::Last3Months => (shift_months(this_month, -3)?, this_month),
            PeriodToken::Last6Months => (shift_months(this_month, -6)?, this_month),
            PeriodToken::CurrentYear => (
                first_of_month(today.year(), 1)?,
                first_of_month(today.year() + 1, 1)?,
            ),
        };

        Ok(DateInterval::new(
            self.local_midnight(start)?,
            self.local_midnight(end)?,
        ))
    }

    /// Interval covering a whole local calendar month.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::InvalidMonth` for a month outside 1..=12.
    pub fn month_interval(&self, year: i32, month: u32) -> Result<DateInterval, PeriodError> {
        let first = first_of_month(year, month)?;
        Ok(DateInterval::new(
            self.local_midnight(first)?,
            self.local_midnight(shift_months(first, 1)?)?,
        ))
    }

    /// First instant of `date` in the business timezone.
    ///
    /// When a DST change skips midnight the day starts at the first valid
    /// local time after it.
    ///
    /// # Errors
    ///
    /// Returns `PeriodError::NonexistentLocalTime` if no instant of the first
    /// hours of the day exists.
    pub fn local_midnight(&self, date: NaiveDate) -> Result<DateTime<Utc>, PeriodError> {
        let midnight = date.and_time(NaiveTime::MIN);
        match self.tz.from_local_datetime(&midnight) {
            LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => Ok(at.with_timezone(&Utc)),
            LocalResult::None => self
                .tz
                .from_local_datetime(&(midnight + Duration::hours(1)))
                .earliest()
                .map(|at| at.with_timezone(&Utc))
                .ok_or(PeriodError::NonexistentLocalTime(date)),
        }
    }
}

/// Inclusive first and last day of a calendar month.
///
/// # Errors
///
/// Returns `PeriodError::InvalidMonth` for a month outside 1..=12.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), PeriodError> {
    let first = first_of_month(year, month)?;
    let last = shift_months(first, 1)?
        .pred_opt()
        .ok_or(PeriodError::OutOfRange)?;
    Ok((first, last))
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, PeriodError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(PeriodError::InvalidMonth { year, month })
}

fn shift_months(date: NaiveDate, months: i32) -> Result<NaiveDate, PeriodError> {
    let delta = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(delta)
    } else {
        date.checked_sub_months(delta)
    }
    .ok_or(PeriodError::OutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rolling_period_ends_now() {
        let resolver = PeriodResolver::new(chrono_tz::UTC);
        let now = utc(2026, 3, 15, 12);

        let period = resolver.resolve(PeriodToken::Last30Days, now).unwrap();

        assert_eq!(period.kind, PeriodKind::Rolling);
        assert_eq!(period.current.start, utc(2026, 2, 13, 12));
        assert_eq!(period.current.end, now);
        assert_eq!(period.previous.start, utc(2026, 1, 14, 12));
        assert_eq!(period.previous.end, period.current.start);
    }

    #[test]
    fn test_one_year_is_365_days() {
        let resolver = PeriodResolver::new(chrono_tz::UTC);
        let now = utc(2026, 3, 15, 12);
        let interval = resolver.interval(PeriodToken::LastYear, now).unwrap();
        assert_eq!(interval.length(), Duration::days(365));
    }

    #[test]
    fn test_current_month_ends_at_next_month() {
        let resolver = PeriodResolver::new(chrono_tz::UTC);
        let period = resolver
            .resolve(PeriodToken::CurrentMonth, utc(2026, 3, 15, 12))
            .unwrap();

        assert_eq!(period.kind, PeriodKind::Calendar);
        assert_eq!(period.current.start, utc(2026, 3, 1, 0));
        assert_eq!(period.current.end, utc(2026, 4, 1, 0));
        // Same length (31 days) immediately before March.
        assert_eq!(period.previous.start, utc(2026, 1, 29, 0));
        assert_eq!(period.previous.end, utc(2026, 3, 1, 0));
    }

    #[test]
    fn test_last_month_uses_local_calendar() {
        // 02:00 UTC on March 1st is still February 28th in São Paulo (UTC-3).
        let resolver = PeriodResolver::new(chrono_tz::America::Sao_Paulo);
        let interval = resolver
            .interval(PeriodToken::LastMonth, utc(2026, 3, 1, 2))
            .unwrap();

        assert_eq!(interval.start, utc(2026, 1, 1, 3));
        assert_eq!(interval.end, utc(2026, 2, 1, 3));
    }

    #[test]
    fn test_last_three_and_six_months_exclude_current_month() {
        let resolver = PeriodResolver::new(chrono_tz::UTC);
        let now = utc(2026, 3, 15, 12);

        let three = resolver.interval(PeriodToken::Last3Months, now).unwrap();
        assert_eq!(three.start, utc(2025, 12, 1, 0));
        assert_eq!(three.end, utc(2026, 3, 1, 0));

        let six = resolver.interval(PeriodToken::Last6Months, now).unwrap();
        assert_eq!(six.start, utc(2025, 9, 1, 0));
        assert_eq!(six.end, utc(2026, 3, 1, 0));
    }

    #[test]
    fn test_current_year() {
        let resolver = PeriodResolver::new(chrono_tz::UTC);
        let interval = resolver
            .interval(PeriodToken::CurrentYear, utc(2026, 7, 4, 9))
            .unwrap();
        assert_eq!(interval.start, utc(2026, 1, 1, 0));
        assert_eq!(interval.end, utc(2027, 1, 1, 0));
    }

    #[test]
    fn test_midnight_skipped_by_dst_starts_at_first_valid_hour() {
        // Brazil moved clocks from 00:00 to 01:00 on 2018-11-04.
        let resolver = PeriodResolver::new(chrono_tz::America::Sao_Paulo);
        let start = resolver.local_midnight(date(2018, 11, 4)).unwrap();
        assert_eq!(start, utc(2018, 11, 4, 3));
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2), Ok((date(2024, 2, 1), date(2024, 2, 29))));
        assert_eq!(month_bounds(2026, 12), Ok((date(2026, 12, 1), date(2026, 12, 31))));
        assert_eq!(
            month_bounds(2026, 13),
            Err(PeriodError::InvalidMonth {
                year: 2026,
                month: 13
            })
        );
    }

    #[test]
    fn test_month_interval_matches_bounds() {
        let resolver = PeriodResolver::new(chrono_tz::UTC);
        let interval = resolver.month_interval(2026, 2).unwrap();
        assert_eq!(interval.start, utc(2026, 2, 1, 0));
        assert_eq!(interval.end, utc(2026, 3, 1, 0));
        assert!(interval.contains(utc(2026, 2, 28, 23)));
        assert!(!interval.contains(interval.end));
    }

    fn token_strategy() -> impl Strategy<Value = PeriodToken> {
        (0..PeriodToken::ALL.len()).prop_map(|i| PeriodToken::ALL[i])
    }

    proptest! {
        /// The comparison interval is contiguous with, and as long as, the current one.
        #[test]
        fn prop_previous_is_contiguous_and_equal_length(
            token in token_strategy(),
            secs in 946_684_800i64..4_102_444_800i64,
        ) {
            let now = DateTime::from_timestamp(secs, 0).unwrap();
            let resolver = PeriodResolver::new(chrono_tz::America::Sao_Paulo);
            let period = resolver.resolve(token, now).unwrap();

            prop_assert!(period.current.start < period.current.end);
            prop_assert_eq!(period.previous.end, period.current.start);
            prop_assert_eq!(period.previous.length(), period.current.length());
            if token.kind() == PeriodKind::Rolling {
                prop_assert_eq!(period.current.end, now);
            }
        }
    }
}
