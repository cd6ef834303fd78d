use chrono::Utc;
use contracts::dashboards::d100_finance::dto::{
    FinanceSnapshot, FinancialStats, LoaderState, Pagination, PaymentAccountPage,
};
use contracts::domain::a001_order::aggregate::Order;
use contracts::domain::a002_payment_account::aggregate::PaymentAccount;
use contracts::enums::order_status::OrderStatus;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Независимые загрузчики дашборда; у каждого своя часть состояния
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderKind {
    Receivables,
    Payables,
}

/// Метка начатой загрузки. Результат применяется, только пока метка
/// остаётся последней для своего загрузчика.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub kind: LoaderKind,
    pub generation: u64,
}

#[derive(Debug, Default)]
struct Inner {
    receivables: Vec<Order>,
    pending_receivables: Vec<Order>,
    receivables_state: LoaderState,
    payables: Vec<PaymentAccount>,
    payables_pagination: Pagination,
    payables_state: LoaderState,
    stats: FinancialStats,
}

impl Inner {
    fn loader(&self, kind: LoaderKind) -> &LoaderState {
        match kind {
            LoaderKind::Receivables => &self.receivables_state,
            LoaderKind::Payables => &self.payables_state,
        }
    }

    fn loader_mut(&mut self, kind: LoaderKind) -> &mut LoaderState {
        match kind {
            LoaderKind::Receivables => &mut self.receivables_state,
            LoaderKind::Payables => &mut self.payables_state,
        }
    }
}

/// Состояние финансового дашборда в памяти (общее, дешево клонируется).
///
/// Блокировка держится только на время обновления полей, никогда во время
/// запроса к учётной системе.
#[derive(Clone, Default)]
pub struct FinanceState {
    inner: Arc<RwLock<Inner>>,
}

impl FinanceState {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Помечает загрузчик занятым и выдаёт новое поколение
    pub fn begin(&self, kind: LoaderKind) -> LoadTicket {
        let mut inner = self.write();
        let loader = inner.loader_mut(kind);
        loader.generation += 1;
        loader.loading = true;
        LoadTicket {
            kind,
            generation: loader.generation,
        }
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.read().loader(ticket.kind).generation == ticket.generation
    }

    /// Применяет `update`, если `ticket` ещё актуален, и снимает флаг занятости.
    /// Возвращает false, если результат устарел и отброшен.
    fn finish<F>(&self, ticket: LoadTicket, update: F) -> bool
    where
        F: FnOnce(&mut Inner),
    {
        let mut inner = self.write();
        let current = inner.loader(ticket.kind).generation;
        if current != ticket.generation {
            tracing::debug!(
                "Discarding stale {:?} result (generation {} < {})",
                ticket.kind,
                ticket.generation,
                current
            );
            return false;
        }
        update(&mut *inner);
        inner.loader_mut(ticket.kind).loading = false;
        true
    }

    pub fn complete_receivables(
        &self,
        ticket: LoadTicket,
        orders: Vec<Order>,
        pending: Vec<Order>,
        total_receivable: f64,
    ) -> bool {
        self.finish(ticket, move |inner| {
            // Field-level merge: payable stats belong to the other loader
            inner.stats.total_receivable = total_receivable;
            inner.stats.pending_order_count = pending.len();
            inner.receivables = orders;
            inner.pending_receivables = pending;
            inner.receivables_state.error = None;
            inner.receivables_state.last_loaded_at = Some(Utc::now());
        })
    }

    /// При ошибке дебиторка сохраняет прежние данные
    pub fn fail_receivables(&self, ticket: LoadTicket, message: String) -> bool {
        self.finish(ticket, move |inner| {
            inner.receivables_state.error = Some(message);
        })
    }

    pub fn complete_payables(
        &self,
        ticket: LoadTicket,
        page: PaymentAccountPage,
        total_payable: f64,
        due_today_count: usize,
    ) -> bool {
        self.finish(ticket, move |inner| {
            inner.stats.total_payable = total_payable;
            inner.stats.due_today_count = due_today_count;
            inner.payables = page.data;
            inner.payables_pagination = page.pagination;
            inner.payables_state.error = None;
            inner.payables_state.last_loaded_at = Some(Utc::now());
        })
    }

    /// При ошибке список счетов очищается
    pub fn fail_payables(&self, ticket: LoadTicket, message: String) -> bool {
        self.finish(ticket, move |inner| {
            inner.payables.clear();
            inner.payables_pagination = Pagination::default();
            inner.payables_state.error = Some(message);
        })
    }

    /// Показывает ошибку загрузчика, не трогая данные и флаг занятости
    pub fn set_error(&self, kind: LoaderKind, message: String) {
        self.write().loader_mut(kind).error = Some(message);
    }

    /// Заменить статус заказа `order_id`; остальные поля не меняются.
    /// Заказ, покинувший `pending`, уходит из подмножества к получению, и
    /// `pending_order_count` / `total_receivable` пересчитываются под той же блокировкой.
    /// Возвращает false, если такого заказа нет среди загруженных.
    pub fn set_order_status(&self, order_id: &str, status: OrderStatus) -> bool {
        let mut inner = self.write();
        let code = status.code().to_string();

        let found = match inner.receivables.iter_mut().find(|o| o.id == order_id) {
            Some(order) => {
                order.status = code.clone();
                true
            }
            None => false,
        };

        if status == OrderStatus::Pending {
            if let Some(order) = inner.pending_receivables.iter_mut().find(|o| o.id == order_id) {
                order.status = code;
            }
        } else {
            inner.pending_receivables.retain(|o| o.id != order_id);
        }

        let pending_count = inner.pending_receivables.len();
        let total: f64 = inner
            .pending_receivables
            .iter()
            .map(Order::amount_or_zero)
            .sum();
        inner.stats.pending_order_count = pending_count;
        inner.stats.total_receivable = total;

        found
    }

    /// Заменить статус счёта к оплате `account_id`
    pub fn set_payable_status(&self, account_id: &str, status_code: &str) -> bool {
        let mut inner = self.write();
        match inner.payables.iter_mut().find(|a| a.id == account_id) {
            Some(account) => {
                account.set_status(status_code);
                true
            }
            None => false,
        }
    }

    pub fn receivables(&self) -> Vec<Order> {
        self.read().receivables.clone()
    }

    pub fn payables(&self) -> Vec<PaymentAccount> {
        self.read().payables.clone()
    }

    pub fn stats(&self) -> FinancialStats {
        self.read().stats.clone()
    }

    pub fn loader(&self, kind: LoaderKind) -> LoaderState {
        self.read().loader(kind).clone()
    }

    pub fn snapshot(&self) -> FinanceSnapshot {
        let inner = self.read();
        FinanceSnapshot {
            receivables: inner.receivables.clone(),
            pending_receivables: inner.pending_receivables.clone(),
            payables: inner.payables.clone(),
            payables_pagination: inner.payables_pagination.clone(),
            stats: inner.stats.clone(),
            receivables_state: inner.receivables_state.clone(),
            payables_state: inner.payables_state.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, status: &str) -> Order {
        serde_json::from_value(serde_json::json!({ "id": id, "status": status })).unwrap()
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let state = FinanceState::new();
        let first = state.begin(LoaderKind::Receivables);
        let second = state.begin(LoaderKind::Receivables);

        assert!(state.complete_receivables(second, vec![order("new", "pending")], vec![], 0.0));
        assert!(!state.complete_receivables(first, vec![order("old", "pending")], vec![], 0.0));

        let receivables = state.receivables();
        assert_eq!(receivables.len(), 1);
        assert_eq!(receivables[0].id, "new");
    }

    #[test]
    fn test_loading_flag_tracks_latest_generation() {
        let state = FinanceState::new();
        let first = state.begin(LoaderKind::Payables);
        let second = state.begin(LoaderKind::Payables);

        state.complete_payables(first, PaymentAccountPage::default(), 1.0, 0);
        assert!(state.loader(LoaderKind::Payables).loading);
        assert!(!state.is_current(first));

        state.complete_payables(second, PaymentAccountPage::default(), 2.0, 0);
        let loader = state.loader(LoaderKind::Payables);
        assert!(!loader.loading);
        assert_eq!(loader.generation, 2);
        assert_eq!(state.stats().total_payable, 2.0);
    }

    #[test]
    fn test_loaders_do_not_clobber_each_others_stats() {
        let state = FinanceState::new();
        let payables = state.begin(LoaderKind::Payables);
        let receivables = state.begin(LoaderKind::Receivables);

        state.complete_payables(payables, PaymentAccountPage::default(), 80.0, 3);
        state.complete_receivables(receivables, vec![], vec![order("a", "pending")], 40.0);

        let stats = state.stats();
        assert_eq!(stats.total_payable, 80.0);
        assert_eq!(stats.due_today_count, 3);
        assert_eq!(stats.total_receivable, 40.0);
        assert_eq!(stats.pending_order_count, 1);
    }

    #[test]
    fn test_failure_rules_per_loader() {
        let state = FinanceState::new();
        let t = state.begin(LoaderKind::Receivables);
        state.complete_receivables(t, vec![order("a", "pending")], vec![], 0.0);
        let t = state.begin(LoaderKind::Receivables);
        state.fail_receivables(t, "boom".into());
        assert_eq!(state.receivables().len(), 1);
        assert_eq!(state.loader(LoaderKind::Receivables).error.as_deref(), Some("boom"));

        let page: PaymentAccountPage = serde_json::from_value(serde_json::json!({
            "data": [{"id": "pa-1", "status": "pending"}]
        }))
        .unwrap();
        let t = state.begin(LoaderKind::Payables);
        state.complete_payables(t, page, 0.0, 0);
        let t = state.begin(LoaderKind::Payables);
        state.fail_payables(t, "boom".into());
        assert!(state.payables().is_empty());
        assert!(!state.loader(LoaderKind::Payables).loading);
    }

    #[test]
    fn test_set_order_status_only_touches_status() {
        let state = FinanceState::new();
        let mut a = order("a", "pending");
        a.total_amount = Some(10.0);
        let t = state.begin(LoaderKind::Receivables);
        state.complete_receivables(t, vec![a.clone(), order("b", "shipped")], vec![a.clone()], 10.0);

        assert!(state.set_order_status("a", OrderStatus::Approved));
        assert!(!state.set_order_status("zzz", OrderStatus::Approved));

        let snapshot = state.snapshot();
        assert_eq!(snapshot.receivables[0].status, "approved");
        assert_eq!(snapshot.receivables[0].total_amount, Some(10.0));
        assert_eq!(snapshot.receivables[1].status, "shipped");
        assert!(snapshot.pending_receivables.is_empty());
        assert_eq!(snapshot.stats.pending_order_count, 0);
        assert_eq!(snapshot.stats.total_receivable, 0.0);
    }

    #[test]
    fn test_stats_follow_pending_subset_after_status_change() {
        let state = FinanceState::new();
        let mut a = order("a", "pending");
        a.total_amount = Some(100.0);
        let mut b = order("b", "pending");
        b.total_amount = Some(200.0);
        let t = state.begin(LoaderKind::Receivables);
        state.complete_receivables(t, vec![a.clone(), b.clone()], vec![a, b], 300.0);

        state.set_order_status("a", OrderStatus::Approved);

        let snapshot = state.snapshot();
        let pending_sum: f64 = snapshot
            .pending_receivables
            .iter()
            .map(Order::amount_or_zero)
            .sum();
        assert_eq!(snapshot.pending_receivables.len(), 1);
        assert_eq!(snapshot.stats.pending_order_count, 1);
        assert_eq!(snapshot.stats.total_receivable, 200.0);
        assert_eq!(snapshot.stats.total_receivable, pending_sum);

        // An unknown id changes nothing
        assert!(!state.set_order_status("zzz", OrderStatus::Approved));
        assert_eq!(state.stats().total_receivable, 200.0);
    }
}
