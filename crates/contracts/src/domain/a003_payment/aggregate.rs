use serde::{Deserialize, Serialize};

use crate::dashboards::d100_finance::dto::Pagination;
use crate::domain::a001_order::aggregate::Order;
use crate::enums::payment_status::PaymentStatus;
use crate::shared::filters::{first_present, status_accessors, FinancialRecord};
use crate::shared::serde_helpers::lenient_amount;

/// Поступление от покупателя по заказу
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Payment {
    /// Код статуса: `payment_status`, затем `status`
    pub fn status_code(&self) -> Option<&str> {
        first_present(self, &status_accessors::<Self>())
    }
}

impl FinancialRecord for Payment {
    fn payment_status(&self) -> Option<&str> {
        self.payment_status.as_deref()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn due_date(&self) -> Option<&str> {
        self.due_date.as_deref()
    }

    fn amount(&self) -> Option<f64> {
        self.amount
    }
}

/// Тело запроса смены статуса платежа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatusUpdate {
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Запись ленты истории покупателя
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombinedItem {
    Order(Order),
    Payment(Payment),
}

impl CombinedItem {
    pub fn id(&self) -> &str {
        match self {
            CombinedItem::Order(order) => &order.id,
            CombinedItem::Payment(payment) => &payment.id,
        }
    }

    fn inner(&self) -> &dyn FinancialRecord {
        match self {
            CombinedItem::Order(order) => order,
            CombinedItem::Payment(payment) => payment,
        }
    }
}

impl FinancialRecord for CombinedItem {
    fn order_number(&self) -> Option<&str> {
        self.inner().order_number()
    }
    fn customer_name(&self) -> Option<&str> {
        self.inner().customer_name()
    }
    fn customer_name_flat(&self) -> Option<&str> {
        self.inner().customer_name_flat()
    }
    fn payment_status(&self) -> Option<&str> {
        self.inner().payment_status()
    }
    fn status(&self) -> Option<&str> {
        self.inner().status()
    }
    fn due_date(&self) -> Option<&str> {
        self.inner().due_date()
    }
    fn order_date(&self) -> Option<&str> {
        self.inner().order_date()
    }
    fn total_amount(&self) -> Option<f64> {
        self.inner().total_amount()
    }
    fn amount(&self) -> Option<f64> {
        self.inner().amount()
    }
}

/// История одного покупателя: заказы и платежи на общей ленте
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerHistory {
    #[serde(default)]
    pub combined: Vec<CombinedItem>,
    #[serde(default)]
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d100_finance::dto::FilterState;
    use crate::shared::filters::apply_filters;

    const HISTORY: &str = r#"{
        "combined": [
            {"type": "order", "id": "o-1", "order_number": "PED-9", "status": "delivered",
             "customer": {"id": "c-1", "name": "Ana Lima"}, "total_amount": 300},
            {"type": "payment", "id": "p-1", "order_id": "o-1", "customer_id": "c-1",
             "amount": "150.00", "status": "paid", "due_date": "2024-03-01"},
            {"type": "payment", "id": "p-2", "order_id": "o-1", "customer_id": "c-1",
             "amount": 150, "status": "pending", "due_date": "2024-04-01"}
        ],
        "pagination": {"page": 1, "limit": 20, "total": 3, "total_pages": 1}
    }"#;

    #[test]
    fn test_deserialize_combined_history() {
        let history: CustomerHistory = serde_json::from_str(HISTORY).unwrap();
        assert_eq!(history.combined.len(), 3);
        assert!(matches!(history.combined[0], CombinedItem::Order(_)));
        assert_eq!(history.combined[1].id(), "p-1");
        assert_eq!(history.pagination.total, 3);
    }

    #[test]
    fn test_payment_status_wins_over_status() {
        let payment: Payment = serde_json::from_str(
            r#"{"id": "p-3", "status": "pending", "payment_status": "paid", "amount": 10}"#,
        )
        .unwrap();
        assert_eq!(payment.status_code(), Some("paid"));

        let items = vec![CombinedItem::Payment(payment)];
        let paid = FilterState {
            status: "paid".into(),
            ..Default::default()
        };
        assert_eq!(apply_filters(&items, "", &paid).len(), 1);
    }

    #[test]
    fn test_combined_items_are_filterable() {
        let history: CustomerHistory = serde_json::from_str(HISTORY).unwrap();

        let pending = FilterState {
            status: "pending".into(),
            ..Default::default()
        };
        let found = apply_filters(&history.combined, "", &pending);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "p-2");

        let found = apply_filters(&history.combined, "ana", &FilterState::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), "o-1");
    }
}
