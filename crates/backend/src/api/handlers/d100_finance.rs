use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use contracts::dashboards::d100_finance::dto::{
    AdvanceStatusRequest, AdvanceStatusResponse, FilteredList, FilteredListQuery,
    FinanceSnapshot, HistoryQuery, PayablesQuery,
};
use contracts::domain::a001_order::aggregate::Order;
use contracts::domain::a002_payment_account::aggregate::{NewPaymentAccount, PaymentAccount};
use contracts::domain::a003_payment::aggregate::{CustomerHistory, Payment, PaymentStatusUpdate};
use contracts::shared::status_taxonomy::{status_display, StatusDisplay};
use serde_json::json;

use crate::dashboards::d100_finance::status_service::{CreateAccountError, Preconfirmed};
use crate::routes::AppState;
use crate::shared::upstream::{PageRequest, UpstreamError};

type ApiError = (StatusCode, Json<serde_json::Value>);

fn upstream_error(e: &UpstreamError) -> ApiError {
    let status = match e {
        UpstreamError::Http { status: 404, .. } => StatusCode::NOT_FOUND,
        UpstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({ "error": e.to_string() })))
}

/// GET /api/d100/finance
pub async fn get_snapshot(State(state): State<AppState>) -> Json<FinanceSnapshot> {
    Json(state.finance.snapshot())
}

/// POST /api/d100/finance/receivables/load
pub async fn load_receivables(State(state): State<AppState>) -> Json<FinanceSnapshot> {
    tracing::info!("D100 Finance: loading receivables");
    state.finance.load_receivables().await;
    Json(state.finance.snapshot())
}

/// POST /api/d100/finance/payables/load?page=1&limit=50&status=pending
///
/// Не больше одного серверного фильтра: статус, затем период, затем поставщик.
pub async fn load_payables(
    State(state): State<AppState>,
    Query(query): Query<PayablesQuery>,
) -> Json<FinanceSnapshot> {
    let finance = &state.finance;
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

    match (
        non_empty(&query.status),
        non_empty(&query.date_start),
        non_empty(&query.date_end),
        non_empty(&query.supplier),
    ) {
        (Some(status), _, _, _) => {
            tracing::info!("D100 Finance: loading payables with status '{}'", status);
            finance.load_payables_by_status(&status).await;
        }
        (None, Some(start), Some(end), _) => {
            tracing::info!("D100 Finance: loading payables for {}..{}", start, end);
            finance.load_payables_by_period(&start, &end).await;
        }
        (None, _, _, Some(supplier)) => {
            tracing::info!("D100 Finance: loading payables of supplier '{}'", supplier);
            finance.load_payables_by_supplier(&supplier).await;
        }
        _ => {
            let page = query.page.unwrap_or(1).max(1);
            let limit = query.limit.unwrap_or_else(|| finance.page_limit()).max(1);
            tracing::info!("D100 Finance: loading payables page {} (limit {})", page, limit);
            finance.load_payables(page, limit).await;
        }
    }

    Json(finance.snapshot())
}

/// GET /api/d100/finance/receivables?search=&status=&start_date=&end_date=&min_value=&max_value=
pub async fn list_receivables(
    State(state): State<AppState>,
    Query(query): Query<FilteredListQuery>,
) -> Json<FilteredList<Order>> {
    Json(
        state
            .finance
            .filtered_receivables(&query.search, &query.filters),
    )
}

/// GET /api/d100/finance/payables (параметры как у receivables)
pub async fn list_payables(
    State(state): State<AppState>,
    Query(query): Query<FilteredListQuery>,
) -> Json<FilteredList<PaymentAccount>> {
    Json(state.finance.filtered_payables(&query.search, &query.filters))
}

/// POST /api/d100/finance/orders/:id/advance
pub async fn advance_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(request): Json<AdvanceStatusRequest>,
) -> Json<AdvanceStatusResponse> {
    let outcome = state
        .finance
        .advance_status(
            &order_id,
            &request.current_status,
            &Preconfirmed(request.confirmed),
        )
        .await;

    if matches!(outcome, AdvanceStatusResponse::Applied { .. }) {
        // Other orders may have moved upstream as well
        state.finance.load_receivables().await;
    }

    Json(outcome)
}

/// PUT /api/d100/finance/payments/:id/status
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    Json(update): Json<PaymentStatusUpdate>,
) -> Result<Json<Payment>, ApiError> {
    state
        .finance
        .update_payment_status(&payment_id, &update)
        .await
        .map(Json)
        .map_err(|e| upstream_error(&e))
}

/// POST /api/d100/finance/payment-accounts
pub async fn create_payment_account(
    State(state): State<AppState>,
    Json(account): Json<NewPaymentAccount>,
) -> Result<(StatusCode, Json<PaymentAccount>), ApiError> {
    match state.finance.create_payment_account(&account).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(created))),
        Err(CreateAccountError::Validation(e)) => {
            tracing::warn!("D100 Finance: {}", e);
            Err((
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": e.to_string(), "fields": e.fields })),
            ))
        }
        Err(CreateAccountError::Upstream(e)) => Err(upstream_error(&e)),
    }
}

/// GET /api/d100/finance/customers/:id/history?page=1&limit=20
pub async fn get_customer_history(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<CustomerHistory>, ApiError> {
    let page = match (query.page, query.limit) {
        (None, None) => None,
        (page, limit) => Some(PageRequest {
            page: page.unwrap_or(1),
            limit: limit.unwrap_or_else(|| state.finance.page_limit()),
        }),
    };

    match state.finance.customer_history(&customer_id, page).await {
        Ok(history) => Ok(Json(history)),
        Err(e) => {
            tracing::error!(
                "D100 Finance: failed to load history of customer {}: {}",
                customer_id,
                e
            );
            Err(upstream_error(&e))
        }
    }
}

/// GET /api/d100/finance/status/:code
pub async fn get_status_display(Path(code): Path<String>) -> Json<StatusDisplay> {
    Json(status_display(&code))
}
