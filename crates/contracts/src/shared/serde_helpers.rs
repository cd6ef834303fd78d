use serde::{Deserialize, Deserializer};

/// Десериализует сумму из строки или числа в Option<f64>
///
/// В ответах встречаются `1234.5`, `"1234.5"`, `"1234,50"`, `""` и `null`.
/// Всё, что не разбирается, становится `None` и не ломает весь документ;
/// агрегаты считают такое значение нулём.
pub fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrFloat {
        String(String),
        Float(f64),
        Other(serde_json::Value),
    }

    Ok(match Option::<StringOrFloat>::deserialize(deserializer)? {
        Some(StringOrFloat::String(s)) => parse_amount(&s),
        Some(StringOrFloat::Float(f)) if f.is_finite() => Some(f),
        _ => None,
    })
}

/// Разбирает сумму из строки. Одиночная запятая считается десятичным
/// разделителем (`"1234,50"`).
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}
