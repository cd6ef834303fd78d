//! Утилиты форматирования для отображения (pt-BR)

use chrono_tz::Tz;

use crate::shared::timezone::{parse_date, parse_local_datetime};

/// Форматирует число с разделителем тысяч (точка) и десятичной запятой
///
/// ```
/// use contracts::shared::format::format_number_with_decimals;
/// assert_eq!(format_number_with_decimals(1234.567, 2), "1.234,57");
/// ```
pub fn format_number_with_decimals(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((i, d)) => (i, Some(d)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::new();
    for (i, ch) in integer_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();

    // -0,00 is shown as 0,00
    let negative = value < 0.0 && formatted.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };

    match decimal_part {
        Some(d) => format!("{}{},{}", sign, grouped, d),
        None => format!("{}{}", sign, grouped),
    }
}

/// Денежное значение в реалах: `R$ 1.234,56`, отрицательное `-R$ 1.234,56`
pub fn format_money(value: f64) -> String {
    let number = format_number_with_decimals(value, 2);
    match number.strip_prefix('-') {
        Some(abs) => format!("-R$ {}", abs),
        None => format!("R$ {}", number),
    }
}

/// Процент с одним знаком: `12,5%`
pub fn format_percent(value: f64) -> String {
    format!("{}%", format_number_with_decimals(value, 1))
}

/// `"2024-03-15"` or `"2024-03-15T14:02:26Z"` -> `"15/03/2024"`
pub fn format_date(date_str: &str) -> String {
    let date_part = date_str.split('T').next().unwrap_or(date_str);
    match parse_date(date_part) {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => date_str.to_string(),
    }
}

/// Дата и время в часовом поясе бизнеса: `"15/03/2024 11:02"`
pub fn format_datetime(datetime_str: &str, tz: Tz) -> String {
    match parse_local_datetime(datetime_str, tz) {
        Some(dt) => dt.format("%d/%m/%Y %H:%M").to_string(),
        None => datetime_str.to_string(),
    }
}
