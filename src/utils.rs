use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;
use std::str::FromStr;

// Slash and dash dates are tried month-first; the day-first shapes only
// match once the leading number can't be a month.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m-%d-%Y %H:%M:%S",
    "%m-%d-%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
    "%d-%b-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d-%b-%Y",
];

/// Parses a ledger timestamp. Returns `None` instead of failing so that
/// callers can keep the record and simply drop it from date-keyed reports.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Offset-aware values keep their wall-clock time
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

fn excel_epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Converts a spreadsheet serial date (days since 1899-12-30) to a timestamp,
/// rounded to the millisecond.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    excel_epoch()?.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
}

pub fn datetime_to_excel_serial(dt: NaiveDateTime) -> f64 {
    match excel_epoch() {
        Some(epoch) => (dt - epoch).num_milliseconds() as f64 / 86_400_000.0,
        None => 0.0,
    }
}

/// Parses a monetary amount, accepting thousands separators and
/// scientific notation. Blank input is not an amount.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

pub fn amount_from_f64(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok().map(|d| d.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_parse_timestamp_common_shapes() {
        assert_eq!(
            parse_timestamp("2024-01-01T10:00"),
            Some(at(2024, 1, 1, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2024-01-02 10:15:30"),
            Some(at(2024, 1, 2, 10, 15, 30))
        );
        assert_eq!(
            parse_timestamp("  15/03/2024 09:05 "),
            Some(at(2024, 3, 15, 9, 5, 0))
        );
        assert_eq!(parse_timestamp("2024-03-15"), Some(at(2024, 3, 15, 0, 0, 0)));
    }

    #[test]
    fn test_parse_timestamp_ambiguous_dates_are_month_first() {
        assert_eq!(
            parse_timestamp("01/02/2024 10:00"),
            Some(at(2024, 1, 2, 10, 0, 0))
        );
        assert_eq!(parse_timestamp("01/02/2024"), Some(at(2024, 1, 2, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("03-04-2024 08:30:15"),
            Some(at(2024, 3, 4, 8, 30, 15))
        );
        // A day above 12 forces the day-first reading
        assert_eq!(
            parse_timestamp("13/02/2024 10:00:00"),
            Some(at(2024, 2, 13, 10, 0, 0))
        );
        assert_eq!(parse_timestamp("25-12-2024"), Some(at(2024, 12, 25, 0, 0, 0)));
    }

    #[test]
    fn test_parse_timestamp_year_first_slashes_and_month_names() {
        assert_eq!(
            parse_timestamp("2024/01/02 10:00:00"),
            Some(at(2024, 1, 2, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("2024/01/02 10:00"),
            Some(at(2024, 1, 2, 10, 0, 0))
        );
        assert_eq!(parse_timestamp("2024/01/02"), Some(at(2024, 1, 2, 0, 0, 0)));
        assert_eq!(
            parse_timestamp("02-Jan-2024 10:00"),
            Some(at(2024, 1, 2, 10, 0, 0))
        );
        assert_eq!(
            parse_timestamp("02-Jan-2024 10:00:45"),
            Some(at(2024, 1, 2, 10, 0, 45))
        );
        assert_eq!(parse_timestamp("02-Jan-2024"), Some(at(2024, 1, 2, 0, 0, 0)));
    }

    #[test]
    fn test_parse_timestamp_keeps_wall_clock_for_offsets() {
        assert_eq!(
            parse_timestamp("2024-01-01T10:00:00+05:30"),
            Some(at(2024, 1, 1, 10, 0, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_garbage_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2024-13-45 10:00"), None);
    }

    #[test]
    fn test_excel_serial_conversion() {
        // 45292 is 2024-01-01 in the 1900 date system
        assert_eq!(
            excel_serial_to_datetime(45292.5),
            Some(at(2024, 1, 1, 12, 0, 0))
        );
        assert_eq!(excel_serial_to_datetime(-1.0), None);

        let serial = datetime_to_excel_serial(at(2024, 1, 1, 12, 0, 0));
        assert!((serial - 45292.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100"), Some(dec!(100)));
        assert_eq!(parse_amount(" 1,234.50 "), Some(dec!(1234.50)));
        assert_eq!(parse_amount("-40.25"), Some(dec!(-40.25)));
        assert_eq!(parse_amount("1e3"), Some(dec!(1000)));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("abc"), None);
    }
}
