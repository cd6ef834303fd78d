pub mod rest_client;

use async_trait::async_trait;
use contracts::dashboards::d100_finance::dto::PaymentAccountPage;
use contracts::domain::a001_order::aggregate::Order;
use contracts::domain::a002_payment_account::aggregate::{NewPaymentAccount, PaymentAccount};
use contracts::domain::a003_payment::aggregate::{CustomerHistory, Payment, PaymentStatusUpdate};
use contracts::enums::order_status::OrderStatus;
use thiserror::Error;

pub use rest_client::RestFinanceApi;

/// Ошибки обращения к учётному API
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Серверные фильтры списка счетов к оплате
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAccountFilter {
    pub status: Option<String>,
    pub supplier: Option<String>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl PaymentAccountFilter {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            status: None,
            supplier: None,
            date_start: None,
            date_end: None,
            page,
            limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

/// Вызовы учётной системы, нужные финансовому дашборду
#[async_trait]
pub trait FinanceApi: Send + Sync {
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, UpstreamError>;

    async fn fetch_payment_accounts(
        &self,
        filter: &PaymentAccountFilter,
    ) -> Result<PaymentAccountPage, UpstreamError>;

    async fn fetch_payments_by_customer(
        &self,
        customer_id: &str,
        page: Option<PageRequest>,
    ) -> Result<CustomerHistory, UpstreamError>;

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), UpstreamError>;

    async fn update_payment_status(
        &self,
        payment_id: &str,
        update: &PaymentStatusUpdate,
    ) -> Result<Payment, UpstreamError>;

    async fn create_payment_account(
        &self,
        account: &NewPaymentAccount,
    ) -> Result<PaymentAccount, UpstreamError>;
}
