use async_trait::async_trait;
use contracts::dashboards::d100_finance::dto::AdvanceStatusResponse;
use contracts::domain::a002_payment_account::aggregate::{
    NewPaymentAccount, PaymentAccount, ValidationError,
};
use contracts::domain::a003_payment::aggregate::{Payment, PaymentStatusUpdate};
use contracts::shared::status_taxonomy::status_display;
use thiserror::Error;

use super::service::FinanceService;
use super::state::LoaderKind;
use crate::shared::upstream::UpstreamError;

/// Результат действия "продвинуть статус"
pub type TransitionOutcome = AdvanceStatusResponse;

/// Запрашивает у оператора подтверждение смены статуса
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Ответ, уже полученный вызывающим (например, пришедший в HTTP-запросе)
#[derive(Debug, Clone, Copy)]
pub struct Preconfirmed(pub bool);

#[async_trait]
impl Confirmation for Preconfirmed {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!("Confirmation '{}' answered: {}", prompt, self.0);
        self.0
    }
}

#[derive(Debug, Error)]
pub enum CreateAccountError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl FinanceService {
    /// Переводит заказ на следующий шаг процесса.
    ///
    /// Без согласия `confirmation` в учётную систему ничего не уходит. При успехе
    /// меняется только статус загруженного заказа и KPI ожидающих.
    pub async fn advance_status(
        &self,
        order_id: &str,
        current_status: &str,
        confirmation: &dyn Confirmation,
    ) -> TransitionOutcome {
        let next = self.policy.next_status_for_code(current_status);
        let prompt = format!(
            "Alterar status do pedido {} de '{}' para '{}'?",
            order_id,
            status_display(current_status).label,
            status_display(next.code()).label
        );

        if !confirmation.confirm(&prompt).await {
            tracing::info!("Status change of order {} declined", order_id);
            return TransitionOutcome::Declined;
        }

        match self.api.update_order_status(order_id, next).await {
            Ok(()) => {
                if !self.state.set_order_status(order_id, next) {
                    tracing::warn!("Order {} advanced but is not loaded locally", order_id);
                }
                tracing::info!(
                    "Order {} status changed: {} -> {}",
                    order_id,
                    current_status,
                    next
                );
                TransitionOutcome::Applied {
                    from: current_status.to_string(),
                    to: next,
                }
            }
            Err(e) => {
                tracing::error!("Failed to advance order {}: {}", order_id, e);
                let message = format!("Erro ao atualizar status do pedido {}: {}", order_id, e);
                self.state.set_error(LoaderKind::Receivables, message.clone());
                TransitionOutcome::Failed { message }
            }
        }
    }

    /// Меняет статус платежа (оплачен, отменён, ...) и правит загруженный счёт
    pub async fn update_payment_status(
        &self,
        payment_id: &str,
        update: &PaymentStatusUpdate,
    ) -> Result<Payment, UpstreamError> {
        match self.api.update_payment_status(payment_id, update).await {
            Ok(payment) => {
                let code = payment
                    .status_code()
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or(update.status.code());
                self.state.set_payable_status(payment_id, code);
                tracing::info!("Payment {} status set to {}", payment_id, code);
                Ok(payment)
            }
            Err(e) => {
                tracing::error!("Failed to update payment {}: {}", payment_id, e);
                self.state.set_error(
                    LoaderKind::Payables,
                    format!("Erro ao atualizar pagamento {}: {}", payment_id, e),
                );
                Err(e)
            }
        }
    }

    /// Проверяет и создаёт счёт к оплате, затем перезагружает первую страницу
    pub async fn create_payment_account(
        &self,
        account: &NewPaymentAccount,
    ) -> Result<PaymentAccount, CreateAccountError> {
        account.validate()?;

        let created = self.api.create_payment_account(account).await.map_err(|e| {
            tracing::error!("Failed to create payment account '{}': {}", account.title, e);
            e
        })?;
        tracing::info!("Payment account {} created", created.id);

        self.load_payables(1, self.page_limit()).await;
        Ok(created)
    }
}
