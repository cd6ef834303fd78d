use serde::{Deserialize, Serialize};

/// Статусы жизненного цикла заказа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Approved,
    InProgress,
    Shipped,
    Delivered,
    Cancelled,
    /// Estornado: возвращённый заказ, снова входит в процесс с `Approved`
    Backout,
}

impl OrderStatus {
    /// Код статуса в учётной системе
    pub fn code(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Backout => "backout",
        }
    }

    pub fn all() -> Vec<OrderStatus> {
        vec![
            OrderStatus::Pending,
            OrderStatus::Approved,
            OrderStatus::InProgress,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Backout,
        ]
    }

    /// Разбирает код в любом регистре. `"In-Progress"`, `"in progress"` и
    /// `"IN_PROGRESS"` дают [`OrderStatus::InProgress`].
    ///
    /// Для неизвестного кода возвращает `None`; замену выбирает вызывающий.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_code(raw);
        OrderStatus::all()
            .into_iter()
            .find(|status| status.code() == normalized)
    }

    /// Статус после действия "продвинуть"
    pub fn next(self) -> OrderStatus {
        match self {
            OrderStatus::Pending => OrderStatus::Approved,
            OrderStatus::Approved => OrderStatus::InProgress,
            OrderStatus::InProgress => OrderStatus::Shipped,
            OrderStatus::Shipped => OrderStatus::Delivered,
            OrderStatus::Delivered => OrderStatus::Delivered,
            OrderStatus::Cancelled => OrderStatus::Cancelled,
            OrderStatus::Backout => OrderStatus::Approved,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Нижний регистр, обрезка пробелов, `-` и пробел заменяются на `_`
pub(crate) fn normalize_code(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}
