use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::a001_order::aggregate::Order;
use crate::domain::a002_payment_account::aggregate::PaymentAccount;
use crate::enums::order_status::OrderStatus;

/// Блок KPI финансового дашборда, пересчитывается при каждой загрузке
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStats {
    pub total_receivable: f64,
    pub total_payable: f64,
    pub pending_order_count: usize,
    pub due_today_count: usize,
}

/// Состояние панели фильтров. Поля хранят сырой ввод, пустая строка = не задано.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub min_value: String,
    #[serde(default)]
    pub max_value: String,
}

/// Запрос отфильтрованных списков: строка поиска и [`FilterState`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilteredListQuery {
    #[serde(default)]
    pub search: String,
    #[serde(flatten)]
    pub filters: FilterState,
}

/// Отфильтрованная часть списка и сумма именно этих строк
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredList<T> {
    pub items: Vec<T>,
    pub count: usize,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub total_pages: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            total: 0,
            total_pages: 0,
        }
    }
}

/// Страница счетов к оплате в том виде, как её отдаёт учётная система
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentAccountPage {
    #[serde(default)]
    pub data: Vec<PaymentAccount>,
    #[serde(default)]
    pub pagination: Pagination,
}

/// Наблюдаемое состояние одного загрузчика (свой индикатор загрузки)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderState {
    pub loading: bool,
    pub error: Option<String>,
    /// Сколько загрузок начато
    pub generation: u64,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// Всё, что показывает финансовый экран, скопированное за одно чтение
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinanceSnapshot {
    /// Все заказы (contas a receber)
    pub receivables: Vec<Order>,
    /// Заказы, ожидающие подтверждения и оплаты
    pub pending_receivables: Vec<Order>,
    /// Текущая страница счетов к оплате (contas a pagar)
    pub payables: Vec<PaymentAccount>,
    pub payables_pagination: Pagination,
    pub stats: FinancialStats,
    pub receivables_state: LoaderState,
    pub payables_state: LoaderState,
}

/// Параметры `POST /api/d100/finance/payables/load`.
///
/// Применяется не больше одного серверного фильтра в порядке
/// статус, период, поставщик.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayablesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub supplier: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceStatusRequest {
    pub current_status: String,
    /// Ответ диалога подтверждения
    #[serde(default)]
    pub confirmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdvanceStatusResponse {
    Applied { from: String, to: OrderStatus },
    Declined,
    Failed { message: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
