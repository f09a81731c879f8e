use crate::error::{AppError, AppResult};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

const MONTH_ABBR: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Parses a `YYYY-MM-DD` request parameter, rejecting it before any query runs.
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}

/// UTC bounds of one business day in a fixed-offset timezone.
/// The end bound is inclusive at millisecond precision, matching how the
/// station devices window their own uploads.
pub fn day_bounds(date: NaiveDate, offset_minutes: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let offset = Duration::minutes(offset_minutes as i64);
    let local_midnight = date.and_time(NaiveTime::MIN);
    let start = Utc.from_utc_datetime(&(local_midnight - offset));
    let end = start + Duration::days(1) - Duration::milliseconds(1);
    (start, end)
}

/// UTC bounds spanning whole business days from `from` through `to`.
pub fn range_bounds(
    from: NaiveDate,
    to: NaiveDate,
    offset_minutes: i32,
) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    if to < from {
        return Err(AppError::ValidationError(
            "to_date must not precede from_date".to_string(),
        ));
    }
    let (start, _) = day_bounds(from, offset_minutes);
    let (_, end) = day_bounds(to, offset_minutes);
    Ok((start, end))
}

pub fn first_of_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::ValidationError(format!("Invalid month {year}-{month:02}")))
}

pub fn last_of_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };
    Ok(next - Duration::days(1))
}

/// Every calendar day from `from` through `to`, inclusive. Used to seed
/// time-bucket aggregations so charts have no gaps.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut day = from;
    while day <= to {
        days.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    days
}

pub fn day_label(date: NaiveDate) -> String {
    format!(
        "{:02} {} {}",
        date.day(),
        title_case(MONTH_ABBR[date.month0() as usize]),
        date.year()
    )
}

/// `AUG-26` style label, as the dashboards render month buckets.
pub fn month_label(year: i32, month: u32) -> String {
    format!("{}-{:02}", MONTH_ABBR[(month - 1) as usize], year % 100)
}

pub fn hour_label(hour: u32) -> String {
    format!("{hour:02}:00")
}

fn title_case(abbr: &str) -> String {
    let mut chars = abbr.chars();
    match chars.next() {
        Some(first) => first.to_string() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-08-29").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
        );
        assert!(parse_date("29/08/2026").is_err());
        assert!(parse_date("not-a-date").is_err());
    }

    #[test]
    fn test_day_bounds_ist() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let (start, end) = day_bounds(date, 330);
        // IST midnight is 18:30 UTC the previous day.
        assert_eq!(start.to_rfc3339(), "2026-08-28T18:30:00+00:00");
        assert!(end > start);
        assert_eq!((end - start).num_milliseconds(), 86_399_999);
    }

    #[test]
    fn test_range_bounds_rejects_inverted_range() {
        let from = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
        assert!(range_bounds(from, to, 0).is_err());
    }

    #[test]
    fn test_days_between_inclusive() {
        let from = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let days = days_between(from, to);
        assert_eq!(days.len(), 4); // 2026 is not a leap year
        assert_eq!(days[0], from);
        assert_eq!(*days.last().unwrap(), to);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            last_of_month(2026, 2).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
        assert_eq!(
            last_of_month(2026, 12).unwrap(),
            NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
        );
        assert!(first_of_month(2026, 13).is_err());
    }

    #[test]
    fn test_labels() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 5).unwrap();
        assert_eq!(day_label(date), "05 Aug 2026");
        assert_eq!(month_label(2026, 8), "AUG-26");
        assert_eq!(hour_label(7), "07:00");
    }
}
