use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::crm::message_counts::MessageCountSource;
use crate::dashboards::d100_finance::service::FinanceService;

/// Общее состояние обработчиков
#[derive(Clone)]
pub struct AppState {
    pub finance: Arc<FinanceService>,
    pub message_counts: Arc<dyn MessageCountSource>,
}

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // D100 FINANCE DASHBOARD
        // ========================================
        .route(
            "/api/d100/finance",
            get(handlers::d100_finance::get_snapshot),
        )
        .route(
            "/api/d100/finance/receivables/load",
            post(handlers::d100_finance::load_receivables),
        )
        .route(
            "/api/d100/finance/payables/load",
            post(handlers::d100_finance::load_payables),
        )
        .route(
            "/api/d100/finance/receivables",
            get(handlers::d100_finance::list_receivables),
        )
        .route(
            "/api/d100/finance/payables",
            get(handlers::d100_finance::list_payables),
        )
        .route(
            "/api/d100/finance/orders/:id/advance",
            post(handlers::d100_finance::advance_order_status),
        )
        .route(
            "/api/d100/finance/payments/:id/status",
            put(handlers::d100_finance::update_payment_status),
        )
        .route(
            "/api/d100/finance/payment-accounts",
            post(handlers::d100_finance::create_payment_account),
        )
        .route(
            "/api/d100/finance/customers/:id/history",
            get(handlers::d100_finance::get_customer_history),
        )
        .route(
            "/api/d100/finance/status/:code",
            get(handlers::d100_finance::get_status_display),
        )
        // CRM
        .route(
            "/api/crm/message-counts",
            get(handlers::crm::get_message_counts),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::message_counts::MessageCounts;
    use crate::dashboards::d100_finance::service::tests::{account, order, page, service, FakeApi};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct StaticCounts(MessageCounts);

    impl MessageCountSource for StaticCounts {
        fn current(&self) -> anyhow::Result<MessageCounts> {
            Ok(self.0.clone())
        }
    }

    fn app(api: Arc<FakeApi>) -> Router {
        let mut counts = MessageCounts::default();
        counts.channels.insert("email".into(), 5);
        counts.channels.insert("whatsapp".into(), 2);
        configure_routes(AppState {
            finance: Arc::new(service(api)),
            message_counts: Arc::new(StaticCounts(counts)),
        })
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                request = request.header("content-type", "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_load_and_filter_receivables() {
        let api = Arc::new(FakeApi::default());
        api.push_orders(Ok(vec![
            order("1", "pending", json!(100)),
            order("2", "pending", json!(200)),
            order("3", "approved", json!(50)),
        ]));
        let app = app(api);

        let (status, snapshot) =
            call(&app, Method::POST, "/api/d100/finance/receivables/load", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["stats"]["total_receivable"], json!(300.0));
        assert_eq!(snapshot["stats"]["pending_order_count"], json!(2));

        let (status, list) = call(
            &app,
            Method::GET,
            "/api/d100/finance/receivables?status=approved",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["count"], json!(1));
        assert_eq!(list["total_amount"], json!(50.0));
    }

    #[tokio::test]
    async fn test_failed_load_still_returns_snapshot() {
        let api = Arc::new(FakeApi::default());
        api.push_orders(Err(crate::shared::upstream::UpstreamError::Network(
            "refused".into(),
        )));
        let app = app(api);

        let (status, snapshot) =
            call(&app, Method::POST, "/api/d100/finance/receivables/load", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(snapshot["receivables_state"]["error"].is_string());
        assert_eq!(snapshot["receivables_state"]["loading"], json!(false));
    }

    #[tokio::test]
    async fn test_payables_load_picks_server_filter() {
        let api = Arc::new(FakeApi::default());
        api.push_accounts(Ok(page(vec![account("a", "pending", 10.0, "2024-03-15")])));
        let app = app(api.clone());

        let (status, snapshot) = call(
            &app,
            Method::POST,
            "/api/d100/finance/payables/load?supplier=CEMIG&date_start=2024-03-01",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot["stats"]["due_today_count"], json!(1));

        let filters = api.account_filters.lock().unwrap();
        // Period needs both ends, so supplier wins
        assert_eq!(filters[0].supplier.as_deref(), Some("CEMIG"));
        assert_eq!(filters[0].date_start, None);
    }

    #[tokio::test]
    async fn test_advance_without_confirmation_is_declined() {
        let api = Arc::new(FakeApi::default());
        let app = app(api.clone());

        let (status, outcome) = call(
            &app,
            Method::POST,
            "/api/d100/finance/orders/o-1/advance",
            Some(json!({ "current_status": "pending" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome, json!({ "outcome": "declined" }));
        assert!(api.status_updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_advance_confirmed_reloads_receivables() {
        let api = Arc::new(FakeApi::default());
        api.push_orders(Ok(vec![order("o-1", "approved", json!(10))]));
        let app = app(api.clone());

        let (_, outcome) = call(
            &app,
            Method::POST,
            "/api/d100/finance/orders/o-1/advance",
            Some(json!({ "current_status": "pending", "confirmed": true })),
        )
        .await;
        assert_eq!(
            outcome,
            json!({ "outcome": "applied", "from": "pending", "to": "approved" })
        );

        let (_, snapshot) = call(&app, Method::GET, "/api/d100/finance", None).await;
        assert_eq!(snapshot["receivables"][0]["status"], json!("approved"));
        assert_eq!(snapshot["receivables_state"]["generation"], json!(1));
    }

    #[tokio::test]
    async fn test_invalid_payment_account_is_rejected() {
        let app = app(Arc::new(FakeApi::default()));

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/d100/finance/payment-accounts",
            Some(json!({ "title": "Aluguel", "total_amount": "0" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields = body["fields"].as_array().unwrap();
        assert!(fields.contains(&json!("supplier_name")));
        assert!(fields.contains(&json!("total_amount")));
    }

    #[tokio::test]
    async fn test_unknown_payment_status_is_rejected() {
        let app = app(Arc::new(FakeApi::default()));

        let (status, _) = call(
            &app,
            Method::PUT,
            "/api/d100/finance/payments/p-1/status",
            Some(json!({ "status": "refunded" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_status_display_and_message_counts() {
        let app = app(Arc::new(FakeApi::default()));

        let (_, display) = call(&app, Method::GET, "/api/d100/finance/status/overdue", None).await;
        assert_eq!(display["label"], json!("Vencido"));

        let (_, unknown) =
            call(&app, Method::GET, "/api/d100/finance/status/awaiting_stock", None).await;
        assert_eq!(unknown["label"], json!("Awaiting stock"));
        assert_eq!(unknown["color"], json!("#6b7280"));

        let (status, counts) = call(&app, Method::GET, "/api/crm/message-counts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counts["total"], json!(7));
    }
}
