use contracts::enums::order_status::OrderStatus;

/// Разбор исходных кодов статуса заказа.
///
/// Неизвестные коды заменяются статусом из конфигурации (по умолчанию `approved`),
/// каждая замена пишется в лог.
#[derive(Debug, Clone, Copy)]
pub struct StatusPolicy {
    pub fallback: OrderStatus,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            fallback: OrderStatus::Approved,
        }
    }
}

impl StatusPolicy {
    pub fn new(fallback: OrderStatus) -> Self {
        Self { fallback }
    }

    /// Приводит код учётной системы в любом регистре к каноническому набору
    pub fn map_order_status(&self, raw: &str) -> OrderStatus {
        match OrderStatus::parse(raw) {
            Some(status) => status,
            None => {
                tracing::warn!(
                    "Unknown order status '{}', using fallback '{}'",
                    raw,
                    self.fallback
                );
                self.fallback
            }
        }
    }

    /// Статус после действия "продвинуть" для исходного текущего кода.
    /// Неизвестный текущий код даёт сам статус по умолчанию.
    pub fn next_status_for_code(&self, raw: &str) -> OrderStatus {
        match OrderStatus::parse(raw) {
            Some(status) => status.next(),
            None => {
                tracing::warn!(
                    "Cannot advance unknown order status '{}', using fallback '{}'",
                    raw,
                    self.fallback
                );
                self.fallback
            }
        }
    }

    /// Строгая проверка для списка ожидающих; неизвестный код никогда не pending
    pub fn is_pending(&self, raw: &str) -> bool {
        OrderStatus::parse(raw) == Some(OrderStatus::Pending)
    }
}
