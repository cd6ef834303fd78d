use serde::{Deserialize, Serialize};

use crate::shared::filters::FinancialRecord;
use crate::shared::serde_helpers::lenient_amount;

/// Покупатель заказа
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderCustomer {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Строка заказа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: Option<f64>,
}

/// Данные об оплате, вложенные в заказ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayment {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Заказ покупателя (дебиторская задолженность)
///
/// `status` хранит исходный код учётной системы; типизированный вид даёт
/// [`OrderStatus::parse`](crate::enums::order_status::OrderStatus::parse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_pedido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_pedido: Option<String>,
    #[serde(default)]
    pub customer: Option<OrderCustomer>,
    /// Плоский вариант `customer.name` из старых выгрузок
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub payment: Option<OrderPayment>,
}

impl Order {
    /// Сумма для агрегатов; отсутствующая или некорректная считается нулём
    pub fn amount_or_zero(&self) -> f64 {
        self.total_amount.unwrap_or(0.0)
    }
}

impl FinancialRecord for Order {
    fn order_number(&self) -> Option<&str> {
        self.order_number
            .as_deref()
            .or(self.numero_pedido.as_deref())
    }

    fn customer_name(&self) -> Option<&str> {
        self.customer.as_ref().and_then(|c| c.name.as_deref())
    }

    fn customer_name_flat(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn order_date(&self) -> Option<&str> {
        self.order_date.as_deref().or(self.data_pedido.as_deref())
    }

    fn total_amount(&self) -> Option<f64> {
        self.total_amount
    }
}
