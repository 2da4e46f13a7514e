//! Conditional-date cutoff arithmetic (§4.I).
//!
//! Calendar arithmetic (year/month subtraction, "start of period") is done
//! in the local timezone, mirroring a `struct tm`-normalising helper: the
//! day-of-month is clamped rather than overflowing into the next month.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};
use fmt_core::Period;

/// Cutoff timestamp (unix seconds) for `period`/`count` relative to now.
pub fn cutoff(period: Period, count: u32) -> i64 {
    cutoff_at(Local::now(), period, count)
}

/// Same as [`cutoff`] but with an injectable "now", for deterministic tests.
pub fn cutoff_at(now: DateTime<Local>, period: Period, count: u32) -> i64 {
    let dt = match period {
        Period::Minutes => {
            if count == 0 {
                now.with_second(0).unwrap().with_nanosecond(0).unwrap()
            } else {
                now - Duration::minutes(count as i64)
            }
        }
        Period::Hours => {
            if count == 0 {
                now.with_minute(0)
                    .unwrap()
                    .with_second(0)
                    .unwrap()
                    .with_nanosecond(0)
                    .unwrap()
            } else {
                now - Duration::hours(count as i64)
            }
        }
        Period::Days => {
            if count == 0 {
                local_midnight(now.date_naive())
            } else {
                now - Duration::days(count as i64)
            }
        }
        Period::Weeks => {
            if count == 0 {
                let since_monday = now.weekday().num_days_from_monday() as i64;
                local_midnight(now.date_naive() - Duration::days(since_monday))
            } else {
                now - Duration::days(7 * count as i64)
            }
        }
        Period::Months => {
            if count == 0 {
                local_midnight(NaiveDate::from_ymd_opt(now.year(), now.month(), 1).unwrap())
            } else {
                shift_months(now, count)
            }
        }
        Period::Years => {
            if count == 0 {
                local_midnight(NaiveDate::from_ymd_opt(now.year(), 1, 1).unwrap())
            } else {
                shift_years(now, count)
            }
        }
    };
    dt.timestamp()
}

fn local_midnight(date: NaiveDate) -> DateTime<Local> {
    local_from_naive(date.and_hms_opt(0, 0, 0).unwrap())
}

fn local_from_naive(ndt: NaiveDateTime) -> DateTime<Local> {
    match Local.from_local_datetime(&ndt) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => Local.from_utc_datetime(&ndt),
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap();
    let last_of_this = first_of_next - Duration::days(1);
    last_of_this.day()
}

fn shift_months(now: DateTime<Local>, count: u32) -> DateTime<Local> {
    let total = now.year() * 12 + (now.month() as i32 - 1) - count as i32;
    let target_year = total.div_euclid(12);
    let target_month = (total.rem_euclid(12) + 1) as u32;
    let day = now.day().min(days_in_month(target_year, target_month));
    let date = NaiveDate::from_ymd_opt(target_year, target_month, day).unwrap();
    local_from_naive(date.and_time(now.time()))
}

fn shift_years(now: DateTime<Local>, count: u32) -> DateTime<Local> {
    let target_year = now.year() - count as i32;
    let day = now.day().min(days_in_month(target_year, now.month()));
    let date = NaiveDate::from_ymd_opt(target_year, now.month(), day).unwrap();
    local_from_naive(date.and_time(now.time()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn days_zero_is_local_midnight_today() {
        let now = at(2026, 7, 28, 14, 30, 0);
        let c = cutoff_at(now, Period::Days, 0);
        assert_eq!(c, at(2026, 7, 28, 0, 0, 0).timestamp());
    }

    #[test]
    fn days_positive_subtracts_whole_days_keeping_time_of_day() {
        let now = at(2026, 7, 28, 14, 30, 0);
        let c = cutoff_at(now, Period::Days, 3);
        assert_eq!(c, at(2026, 7, 25, 14, 30, 0).timestamp());
    }

    #[test]
    fn weeks_zero_is_most_recent_monday_midnight() {
        // 2026-07-28 is a Tuesday.
        let now = at(2026, 7, 28, 9, 0, 0);
        let c = cutoff_at(now, Period::Weeks, 0);
        assert_eq!(c, at(2026, 7, 27, 0, 0, 0).timestamp());
    }

    #[test]
    fn months_zero_is_first_of_month_midnight() {
        let now = at(2026, 7, 28, 9, 0, 0);
        let c = cutoff_at(now, Period::Months, 0);
        assert_eq!(c, at(2026, 7, 1, 0, 0, 0).timestamp());
    }

    #[test]
    fn months_positive_clamps_overflowing_day() {
        // March 31st minus one month has no April 31st; clamp to April 30th.
        let now = at(2026, 3, 31, 10, 0, 0);
        let c = cutoff_at(now, Period::Months, 1);
        assert_eq!(c, at(2026, 2, 28, 10, 0, 0).timestamp());
    }

    #[test]
    fn years_zero_is_jan_first_midnight() {
        let now = at(2026, 7, 28, 9, 0, 0);
        let c = cutoff_at(now, Period::Years, 0);
        assert_eq!(c, at(2026, 1, 1, 0, 0, 0).timestamp());
    }

    #[test]
    fn hours_zero_truncates_minutes_and_seconds() {
        let now = at(2026, 7, 28, 14, 37, 52);
        let c = cutoff_at(now, Period::Hours, 0);
        assert_eq!(c, at(2026, 7, 28, 14, 0, 0).timestamp());
    }
}
