//! Календарь бизнеса.
//!
//! Все решения про "сегодня" и диапазоны дат принимаются в часовом поясе
//! бизнеса, а не в локальном поясе сервера.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;

/// Часовой пояс бизнеса
pub const BUSINESS_TZ: Tz = chrono_tz::America::Sao_Paulo;

/// Календарная дата `now` в `tz`
pub fn civil_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Разбирает дату `YYYY-MM-DD`, пробелы по краям игнорируются
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Разбирает дату записи в местное время `tz`.
///
/// Принимает `YYYY-MM-DD` (полночь), `YYYY-MM-DDTHH:MM:SS[.fff]` без смещения,
/// в том числе с пробелом вместо `T` (считается уже местным), и RFC 3339
/// со смещением (переводится в `tz`).
pub fn parse_local_datetime(raw: &str, tz: Tz) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz).naive_local());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(dt);
        }
    }
    let date_part = raw.get(..10).unwrap_or(raw);
    parse_date(date_part).map(|d| d.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_civil_date_differs_from_utc_late_evening() {
        // 2024-03-15 23:30 in São Paulo is already the 16th in UTC
        let now = Utc.with_ymd_and_hms(2024, 3, 16, 2, 30, 0).unwrap();
        assert_eq!(
            civil_date(now, BUSINESS_TZ),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(now.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
    }

    #[test]
    fn test_parse_local_datetime() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            parse_local_datetime("2024-03-15", BUSINESS_TZ),
            Some(date.and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(
            parse_local_datetime("2024-03-15T14:02:26.123", BUSINESS_TZ),
            Some(date.and_hms_milli_opt(14, 2, 26, 123).unwrap())
        );
        assert_eq!(
            parse_local_datetime("2024-03-16T01:00:00Z", BUSINESS_TZ),
            Some(date.and_hms_opt(22, 0, 0).unwrap())
        );
        assert_eq!(parse_local_datetime("ontem", BUSINESS_TZ), None);
        assert_eq!(parse_local_datetime("", BUSINESS_TZ), None);
    }
}
