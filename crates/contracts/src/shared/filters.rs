//! Фильтрация разнородных финансовых записей на стороне сервиса.
//!
//! Схемы учётных систем по-разному называют поля (`customer.name`, `customer_name`,
//! `fornecedor_nome`, `payment_status` или `status`, ...). Записи отдают то, что
//! у них есть, через [`FinancialRecord`]; для каждого критерия перебирается
//! упорядоченный список геттеров, побеждает первое присутствующее поле.
//! Отсутствующее поле означает несовпадение, а не ошибку.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;

use crate::dashboards::d100_finance::dto::FilterState;
use crate::shared::serde_helpers::parse_amount;
use crate::shared::timezone::{parse_date, parse_local_datetime, BUSINESS_TZ};

/// Необязательные геттеры полей всего, что бывает в финансовых списках.
/// По умолчанию каждый геттер возвращает "поля нет".
pub trait FinancialRecord {
    fn order_number(&self) -> Option<&str> {
        None
    }
    /// `customer.name`
    fn customer_name(&self) -> Option<&str> {
        None
    }
    /// `customer_name`
    fn customer_name_flat(&self) -> Option<&str> {
        None
    }
    /// `fornecedor_nome`
    fn supplier_name(&self) -> Option<&str> {
        None
    }
    fn title(&self) -> Option<&str> {
        None
    }
    fn description(&self) -> Option<&str> {
        None
    }
    fn payment_status(&self) -> Option<&str> {
        None
    }
    fn status(&self) -> Option<&str> {
        None
    }
    fn due_date(&self) -> Option<&str> {
        None
    }
    /// `data_vencimento`
    fn scheduled_date(&self) -> Option<&str> {
        None
    }
    fn order_date(&self) -> Option<&str> {
        None
    }
    fn total_amount(&self) -> Option<f64> {
        None
    }
    fn amount(&self) -> Option<f64> {
        None
    }
    /// `valor_total`
    fn total_value(&self) -> Option<f64> {
        None
    }
}

/// Геттер строкового поля
pub type TextGetter<R> = for<'a> fn(&'a R) -> Option<&'a str>;
/// Геттер числового поля
pub type ValueGetter<R> = fn(&R) -> Option<f64>;

/// Текстовые поля в порядке поиска
pub fn text_accessors<R: FinancialRecord>() -> [(&'static str, TextGetter<R>); 6] {
    [
        ("order_number", R::order_number as TextGetter<R>),
        ("customer.name", R::customer_name as TextGetter<R>),
        ("customer_name", R::customer_name_flat as TextGetter<R>),
        ("fornecedor_nome", R::supplier_name as TextGetter<R>),
        ("title", R::title as TextGetter<R>),
        ("description", R::description as TextGetter<R>),
    ]
}

/// Поля статуса, побеждает первое присутствующее
pub fn status_accessors<R: FinancialRecord>() -> [(&'static str, TextGetter<R>); 2] {
    [
        ("payment_status", R::payment_status as TextGetter<R>),
        ("status", R::status as TextGetter<R>),
    ]
}

/// Поля даты, побеждает первое присутствующее
pub fn date_accessors<R: FinancialRecord>() -> [(&'static str, TextGetter<R>); 3] {
    [
        ("due_date", R::due_date as TextGetter<R>),
        ("data_vencimento", R::scheduled_date as TextGetter<R>),
        ("order_date", R::order_date as TextGetter<R>),
    ]
}

/// Поля суммы, побеждает первое присутствующее
pub fn value_accessors<R: FinancialRecord>() -> [(&'static str, ValueGetter<R>); 3] {
    [
        ("total_amount", R::total_amount as ValueGetter<R>),
        ("amount", R::amount as ValueGetter<R>),
        ("valor_total", R::total_value as ValueGetter<R>),
    ]
}

/// Значение первого присутствующего поля из списка
pub fn first_present<'a, R>(record: &'a R, accessors: &[(&'static str, TextGetter<R>)]) -> Option<&'a str> {
    accessors.iter().find_map(|(_, get)| get(record))
}

/// Сумма для фильтра по диапазону и для итогов отфильтрованного списка
pub fn record_value<R: FinancialRecord>(record: &R) -> f64 {
    value_accessors::<R>()
        .iter()
        .find_map(|(_, get)| get(record))
        .unwrap_or(0.0)
}

/// Дата и время для фильтра по периоду, в местном времени бизнеса
pub fn record_datetime<R: FinancialRecord>(record: &R, tz: Tz) -> Option<NaiveDateTime> {
    first_present(record, &date_accessors::<R>()).and_then(|raw| parse_local_datetime(raw, tz))
}

/// Поиск подстроки без учёта регистра по текстовым полям.
///
/// Обе стороны проходят Unicode `to_lowercase`; диакритика сохраняется,
/// поэтому `"joão"` находит `"João Silva"`, а `"joao"` нет.
pub fn matches_search<R: FinancialRecord>(record: &R, search_term: &str) -> bool {
    let needle = search_term.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    text_accessors::<R>()
        .iter()
        .filter_map(|(_, get)| get(record))
        .any(|value| value.to_lowercase().contains(&needle))
}

/// Критерии, разобранные из [`FilterState`] один раз; пустые и неразборчивые части равны `None`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    pub search: String,
    pub status: Option<String>,
    pub period: Option<(NaiveDateTime, NaiveDateTime)>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl CompiledFilter {
    pub fn new(search_term: &str, filters: &FilterState) -> Self {
        let non_empty = |s: &str| {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        };

        // Date range only when both ends are set; end is inclusive up to 23:59:59.999
        let period = match (parse_date(&filters.start_date), parse_date(&filters.end_date)) {
            (Some(start), Some(end)) => Some((start.and_time(NaiveTime::MIN), end_of_day(end))),
            _ => None,
        };

        Self {
            search: search_term.trim().to_string(),
            status: non_empty(&filters.status),
            period,
            min_value: parse_amount(&filters.min_value),
            max_value: parse_amount(&filters.max_value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.status.is_none()
            && self.period.is_none()
            && self.min_value.is_none()
            && self.max_value.is_none()
    }

    pub fn matches<R: FinancialRecord>(&self, record: &R, tz: Tz) -> bool {
        if !matches_search(record, &self.search) {
            return false;
        }

        if let Some(status) = &self.status {
            match first_present(record, &status_accessors::<R>()) {
                Some(value) if value == status.as_str() => {}
                _ => return false,
            }
        }

        if let Some((start, end)) = self.period {
            match record_datetime(record, tz) {
                Some(at) if at >= start && at <= end => {}
                _ => return false,
            }
        }

        if self.min_value.is_some() || self.max_value.is_some() {
            let value = record_value(record);
            if self.min_value.is_some_and(|min| value < min) {
                return false;
            }
            if self.max_value.is_some_and(|max| value > max) {
                return false;
            }
        }

        true
    }
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::milliseconds(1)
}

/// Фильтрует `records` по строке поиска и состоянию фильтров (логическое И).
///
/// Вход не изменяется, порядок сохраняется; пустой поиск с пустым
/// [`FilterState`] возвращает все записи.
pub fn apply_filters<R: FinancialRecord + Clone>(
    records: &[R],
    search_term: &str,
    filters: &FilterState,
) -> Vec<R> {
    apply_filters_in(records, search_term, filters, BUSINESS_TZ)
}

/// [`apply_filters`] с явным часовым поясом бизнеса
pub fn apply_filters_in<R: FinancialRecord + Clone>(
    records: &[R],
    search_term: &str,
    filters: &FilterState,
    tz: Tz,
) -> Vec<R> {
    let compiled = CompiledFilter::new(search_term, filters);
    if compiled.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| compiled.matches(*record, tz))
        .cloned()
        .collect()
}
