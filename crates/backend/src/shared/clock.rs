use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Источник текущего времени; в тестах подменяется фиксированным
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Календарная дата в часовом поясе бизнеса
    fn today(&self, tz: Tz) -> NaiveDate {
        contracts::shared::timezone::civil_date(self.now(), tz)
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Часы, остановленные на одном моменте
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
