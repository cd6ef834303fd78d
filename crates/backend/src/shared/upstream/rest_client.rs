use async_trait::async_trait;
use contracts::dashboards::d100_finance::dto::PaymentAccountPage;
use contracts::domain::a001_order::aggregate::Order;
use contracts::domain::a002_payment_account::aggregate::{NewPaymentAccount, PaymentAccount};
use contracts::domain::a003_payment::aggregate::{CustomerHistory, Payment, PaymentStatusUpdate};
use contracts::enums::order_status::OrderStatus;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{FinanceApi, PageRequest, PaymentAccountFilter, UpstreamError};
use crate::shared::config::UpstreamConfig;

/// HTTP-клиент учётного REST API (заказы, счета к оплате, поступления)
pub struct RestFinanceApi {
    client: reqwest::Client,
    base_url: String,
}

/// Эндпоинт заказов отвечает либо массивом, либо `{"data": [...]}`
#[derive(Deserialize)]
#[serde(untagged)]
enum OrdersEnvelope {
    List(Vec<Order>),
    Wrapped { data: Vec<Order> },
}

impl RestFinanceApi {
    pub fn new(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UpstreamError::Network(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Отправляет запрос и разбирает JSON, любая ошибка превращается в [`UpstreamError`]
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, UpstreamError> {
        let response = self.send(request, url).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| UpstreamError::Decode(format!("{}: {}", url, e)))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, UpstreamError> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout(url.to_string())
                } else {
                    UpstreamError::Network(format!("{}: {}", url, e))
                }
            })?;

        let status = response.status();
        tracing::debug!("Finance API response: {} for {}", status, url);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Finance API: HTTP {} for {}: {}", status, url, body);
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

/// Параметры запроса списка счетов; незаданные фильтры не передаются
fn payment_account_query(filter: &PaymentAccountFilter) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", filter.page.to_string()),
        ("limit", filter.limit.to_string()),
    ];
    let optional = [
        ("status", &filter.status),
        ("supplier", &filter.supplier),
        ("date_start", &filter.date_start),
        ("date_end", &filter.date_end),
    ];
    for (key, value) in optional {
        if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            query.push((key, v.to_string()));
        }
    }
    query
}

#[async_trait]
impl FinanceApi for RestFinanceApi {
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, UpstreamError> {
        let url = self.url("orders");
        tracing::info!("Finance API: GET {}", url);

        let envelope: OrdersEnvelope = self.send_json(self.client.get(&url), &url).await?;
        let orders = match envelope {
            OrdersEnvelope::List(orders) => orders,
            OrdersEnvelope::Wrapped { data } => data,
        };

        tracing::info!("Finance API: got {} orders", orders.len());
        Ok(orders)
    }

    async fn fetch_payment_accounts(
        &self,
        filter: &PaymentAccountFilter,
    ) -> Result<PaymentAccountPage, UpstreamError> {
        let url = self.url("payment-accounts");
        let query = payment_account_query(filter);
        tracing::info!("Finance API: GET {} {:?}", url, query);

        let page: PaymentAccountPage = self
            .send_json(self.client.get(&url).query(&query), &url)
            .await?;

        tracing::info!(
            "Finance API: got {} payment accounts (page {}/{})",
            page.data.len(),
            page.pagination.page,
            page.pagination.total_pages
        );
        Ok(page)
    }

    async fn fetch_payments_by_customer(
        &self,
        customer_id: &str,
        page: Option<PageRequest>,
    ) -> Result<CustomerHistory, UpstreamError> {
        let url = self.url(&format!(
            "customers/{}/payments",
            urlencoding::encode(customer_id)
        ));
        tracing::info!("Finance API: GET {}", url);

        let mut request = self.client.get(&url);
        if let Some(p) = page {
            request = request.query(&[("page", p.page), ("limit", p.limit)]);
        }
        self.send_json(request, &url).await
    }

    async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
    ) -> Result<(), UpstreamError> {
        let url = self.url(&format!("orders/{}/status", urlencoding::encode(order_id)));
        tracing::info!("Finance API: PATCH {} -> {}", url, status);

        let body = serde_json::json!({ "status": status });
        self.send(self.client.patch(&url).json(&body), &url).await?;
        Ok(())
    }

    async fn update_payment_status(
        &self,
        payment_id: &str,
        update: &PaymentStatusUpdate,
    ) -> Result<Payment, UpstreamError> {
        let url = self.url(&format!(
            "payments/{}/status",
            urlencoding::encode(payment_id)
        ));
        tracing::info!("Finance API: PATCH {} -> {}", url, update.status);

        self.send_json(self.client.patch(&url).json(update), &url)
            .await
    }

    async fn create_payment_account(
        &self,
        account: &NewPaymentAccount,
    ) -> Result<PaymentAccount, UpstreamError> {
        let url = self.url("payment-accounts");
        tracing::info!("Finance API: POST {} ('{}')", url, account.title);

        self.send_json(self.client.post(&url).json(account), &url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_account_query_skips_unset_filters() {
        let mut filter = PaymentAccountFilter::page(2, 25);
        filter.supplier = Some("  CEMIG ".into());
        filter.status = Some("".into());

        assert_eq!(
            payment_account_query(&filter),
            vec![
                ("page", "2".to_string()),
                ("limit", "25".to_string()),
                ("supplier", "CEMIG".to_string()),
            ]
        );
    }

    #[test]
    fn test_orders_envelope_accepts_both_shapes() {
        let bare: OrdersEnvelope = serde_json::from_str(r#"[{"id": "o-1"}]"#).unwrap();
        assert!(matches!(bare, OrdersEnvelope::List(ref v) if v.len() == 1));

        let wrapped: OrdersEnvelope =
            serde_json::from_str(r#"{"data": [{"id": "o-1"}, {"id": "o-2"}]}"#).unwrap();
        assert!(matches!(wrapped, OrdersEnvelope::Wrapped { ref data } if data.len() == 2));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let api = RestFinanceApi::new(&UpstreamConfig {
            base_url: "http://erp.local/api/".into(),
            timeout_secs: 5,
        })
        .unwrap();
        assert_eq!(api.url("orders"), "http://erp.local/api/orders");
    }
}
