use serde::{Deserialize, Serialize};

use super::order_status::normalize_code;

/// Статусы оплаты счетов к оплате и поступлений
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
    DueToday,
}

impl PaymentStatus {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Cancelled => "cancelled",
            PaymentStatus::DueToday => "due_today",
        }
    }

    pub fn all() -> Vec<PaymentStatus> {
        vec![
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Overdue,
            PaymentStatus::Cancelled,
            PaymentStatus::DueToday,
        ]
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_code(raw);
        PaymentStatus::all()
            .into_iter()
            .find(|status| status.code() == normalized)
    }

    /// Считается ли сумма ещё не оплаченной
    pub fn is_open(&self) -> bool {
        !matches!(self, PaymentStatus::Paid | PaymentStatus::Cancelled)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
