use chrono::NaiveDate;
use chrono_tz::Tz;
use contracts::dashboards::d100_finance::dto::{FilterState, FilteredList, FinanceSnapshot};
use contracts::domain::a001_order::aggregate::Order;
use contracts::domain::a002_payment_account::aggregate::PaymentAccount;
use contracts::domain::a003_payment::aggregate::CustomerHistory;
use contracts::enums::payment_status::PaymentStatus;
use contracts::shared::filters::{apply_filters_in, record_value, FinancialRecord};
use contracts::shared::timezone::parse_local_datetime;
use std::sync::Arc;

use super::state::{FinanceState, LoaderKind};
use crate::shared::clock::Clock;
use crate::shared::status_policy::StatusPolicy;
use crate::shared::upstream::{FinanceApi, PageRequest, PaymentAccountFilter, UpstreamError};

/// Слой агрегации финансового дашборда.
///
/// Каждый загрузчик получает свою часть из учётной системы, считает свои KPI
/// и сливает их в общее состояние. Загрузчики не возвращают ошибок:
/// ошибка записывается в загрузчик и читается из снимка.
pub struct FinanceService {
    pub(super) api: Arc<dyn FinanceApi>,
    pub(super) state: FinanceState,
    clock: Arc<dyn Clock>,
    pub(super) policy: StatusPolicy,
    tz: Tz,
    page_limit: u32,
}

impl FinanceService {
    pub fn new(
        api: Arc<dyn FinanceApi>,
        clock: Arc<dyn Clock>,
        policy: StatusPolicy,
        tz: Tz,
        page_limit: u32,
    ) -> Self {
        Self {
            api,
            state: FinanceState::new(),
            clock,
            policy,
            tz,
            page_limit,
        }
    }

    pub fn state(&self) -> &FinanceState {
        &self.state
    }

    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    pub fn snapshot(&self) -> FinanceSnapshot {
        self.state.snapshot()
    }

    /// Загружает все заказы и выделяет ожидающие (к получению) на своей стороне
    pub async fn load_receivables(&self) {
        let ticket = self.state.begin(LoaderKind::Receivables);

        match self.api.fetch_all_orders().await {
            Ok(orders) => {
                let orders = normalize_orders(orders, &self.policy);
                let pending = pending_orders(&orders, &self.policy);
                let total = receivable_total(&pending);
                let (count, pending_count) = (orders.len(), pending.len());

                if self.state.complete_receivables(ticket, orders, pending, total) {
                    tracing::info!(
                        "Receivables loaded: {} orders, {} pending, total {:.2}",
                        count,
                        pending_count,
                        total
                    );
                }
            }
            Err(e) => {
                tracing::error!("Failed to load receivables: {}", e);
                self.state
                    .fail_receivables(ticket, format!("Erro ao carregar contas a receber: {}", e));
            }
        }
    }

    /// Загружает страницу счетов к оплате без серверных фильтров
    pub async fn load_payables(&self, page: u32, limit: u32) {
        self.fetch_payables(PaymentAccountFilter::page(page, limit))
            .await;
    }

    pub async fn load_payables_by_status(&self, status: &str) {
        let mut filter = PaymentAccountFilter::page(1, self.page_limit);
        filter.status = Some(status.to_string());
        self.fetch_payables(filter).await;
    }

    pub async fn load_payables_by_period(&self, start: &str, end: &str) {
        let mut filter = PaymentAccountFilter::page(1, self.page_limit);
        filter.date_start = Some(start.to_string());
        filter.date_end = Some(end.to_string());
        self.fetch_payables(filter).await;
    }

    pub async fn load_payables_by_supplier(&self, name: &str) {
        let mut filter = PaymentAccountFilter::page(1, self.page_limit);
        filter.supplier = Some(name.to_string());
        self.fetch_payables(filter).await;
    }

    /// Любой загрузчик счетов заменяет список целиком, без слияния
    async fn fetch_payables(&self, filter: PaymentAccountFilter) {
        let ticket = self.state.begin(LoaderKind::Payables);

        match self.api.fetch_payment_accounts(&filter).await {
            Ok(page) => {
                let today = self.clock.today(self.tz);
                let (total, due_today) = payable_totals(&page.data, today, self.tz);
                let count = page.data.len();

                if self.state.complete_payables(ticket, page, total, due_today) {
                    tracing::info!(
                        "Payables loaded: {} accounts, open total {:.2}, {} due today ({})",
                        count,
                        total,
                        due_today,
                        today
                    );
                }
            }
            Err(e) => {
                tracing::error!("Failed to load payables ({:?}): {}", filter, e);
                self.state
                    .fail_payables(ticket, format!("Erro ao carregar contas a pagar: {}", e));
            }
        }
    }

    /// Заказы и платежи одного покупателя на общей ленте
    pub async fn customer_history(
        &self,
        customer_id: &str,
        page: Option<PageRequest>,
    ) -> Result<CustomerHistory, UpstreamError> {
        let history = self.api.fetch_payments_by_customer(customer_id, page).await?;
        tracing::info!(
            "Customer {} history: {} entries",
            customer_id,
            history.combined.len()
        );
        Ok(history)
    }

    pub fn filtered_receivables(&self, search: &str, filters: &FilterState) -> FilteredList<Order> {
        filtered(&self.state.receivables(), search, filters, self.tz)
    }

    pub fn filtered_payables(
        &self,
        search: &str,
        filters: &FilterState,
    ) -> FilteredList<PaymentAccount> {
        filtered(&self.state.payables(), search, filters, self.tz)
    }
}

/// Приводит коды статусов к каноническому виду для точного фильтра по статусу.
/// Неизвестные коды заменяются через политику статусов (с записью в лог).
fn normalize_orders(orders: Vec<Order>, policy: &StatusPolicy) -> Vec<Order> {
    orders
        .into_iter()
        .map(|mut order| {
            order.status = policy.map_order_status(&order.status).code().to_string();
            order
        })
        .collect()
}

pub fn pending_orders(orders: &[Order], policy: &StatusPolicy) -> Vec<Order> {
    orders
        .iter()
        .filter(|o| policy.is_pending(&o.status))
        .cloned()
        .collect()
}

/// Сумма заказов; отсутствующая или некорректная сумма считается нулём
pub fn receivable_total(orders: &[Order]) -> f64 {
    orders.iter().map(Order::amount_or_zero).sum()
}

/// Открытая сумма (статус не paid и не cancelled) и число счетов pending
/// со сроком на `today`
pub fn payable_totals(accounts: &[PaymentAccount], today: NaiveDate, tz: Tz) -> (f64, usize) {
    let mut total = 0.0;
    let mut due_today = 0;

    for account in accounts {
        let status = account.parsed_status();
        if status.map_or(true, |s| s.is_open()) {
            total += account.amount_or_zero();
        }
        if status == Some(PaymentStatus::Pending) && scheduled_on(account, today, tz) {
            due_today += 1;
        }
    }

    (total, due_today)
}

/// Дата оплаты в бизнес-часовом поясе; время, если есть, отбрасывается
fn scheduled_on(account: &PaymentAccount, day: NaiveDate, tz: Tz) -> bool {
    account
        .scheduled_for()
        .and_then(|raw| parse_local_datetime(raw, tz))
        .map(|dt| dt.date())
        == Some(day)
}

fn filtered<R: FinancialRecord + Clone>(
    records: &[R],
    search: &str,
    filters: &FilterState,
    tz: Tz,
) -> FilteredList<R> {
    let items = apply_filters_in(records, search, filters, tz);
    let total_amount = items.iter().map(record_value).sum();
    FilteredList {
        count: items.len(),
        total_amount,
        items,
    }
}
