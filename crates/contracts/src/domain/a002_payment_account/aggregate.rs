use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::payment_status::PaymentStatus;
use crate::shared::filters::{first_present, record_value, status_accessors, FinancialRecord};
use crate::shared::serde_helpers::lenient_amount;
use crate::shared::timezone::parse_date;

/// Счёт к оплате поставщику (кредиторская задолженность).
///
/// Учётные системы присылают одно и то же поле под разными именами
/// (`supplier_name` / `fornecedor_nome`, `payment_status` / `status`, ...),
/// иногда оба сразу. Каждый вариант хранится в своём поле, приоритет задают
/// геттеры [`FinancialRecord`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titulo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fornecedor_nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_amount: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub valor_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_criacao: Option<String>,
    /// Плановая дата оплаты, `YYYY-MM-DD`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_vencimento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl PaymentAccount {
    /// Сумма для агрегатов: тот же приоритет полей, что и у фильтра по сумме
    pub fn amount_or_zero(&self) -> f64 {
        record_value(self)
    }

    /// Код статуса: `payment_status`, затем `status`
    pub fn status_code(&self) -> Option<&str> {
        first_present(self, &status_accessors::<Self>())
    }

    pub fn parsed_status(&self) -> Option<PaymentStatus> {
        self.status_code().and_then(PaymentStatus::parse)
    }

    /// Плановая дата оплаты: `data_vencimento`, затем `payment_date`
    pub fn scheduled_for(&self) -> Option<&str> {
        self.data_vencimento
            .as_deref()
            .or(self.payment_date.as_deref())
    }

    /// Записать новый статус в то поле, которое сейчас определяет статус
    pub fn set_status(&mut self, code: &str) {
        if self.payment_status.is_some() {
            self.payment_status = Some(code.to_string());
        }
        if self.status.is_some() || self.payment_status.is_none() {
            self.status = Some(code.to_string());
        }
    }
}

impl FinancialRecord for PaymentAccount {
    fn supplier_name(&self) -> Option<&str> {
        self.fornecedor_nome
            .as_deref()
            .or(self.supplier_name.as_deref())
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref().or(self.titulo.as_deref())
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref().or(self.descricao.as_deref())
    }

    fn payment_status(&self) -> Option<&str> {
        self.payment_status.as_deref()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn scheduled_date(&self) -> Option<&str> {
        self.scheduled_for()
    }

    fn total_amount(&self) -> Option<f64> {
        self.total_amount
    }

    fn total_value(&self) -> Option<f64> {
        self.valor_total
    }
}

/// Данные формы создания счёта к оплате
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPaymentAccount {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub supplier_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub payment_date: String,
    #[serde(default)]
    pub status: Option<PaymentStatus>,
}

/// Ошибка валидации формы: перечень полей, которые нужно исправить
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("invalid payment account: {}", .fields.join(", "))]
pub struct ValidationError {
    pub fields: Vec<String>,
}

impl NewPaymentAccount {
    /// Проверка обязательных полей до отправки в учётную систему
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut fields = Vec::new();

        if self.title.trim().is_empty() {
            fields.push("title".to_string());
        }
        if self.supplier_name.trim().is_empty() {
            fields.push("supplier_name".to_string());
        }
        if !self.total_amount.is_some_and(|v| v > 0.0) {
            fields.push("total_amount".to_string());
        }
        if parse_date(&self.payment_date).is_none() {
            fields.push("payment_date".to_string());
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d100_finance::dto::{FilterState, PaymentAccountPage};
    use crate::shared::filters::apply_filters;

    fn valid() -> NewPaymentAccount {
        NewPaymentAccount {
            title: "Aluguel".into(),
            supplier_name: "Imobiliária Centro".into(),
            description: None,
            total_amount: Some(3500.0),
            payment_date: "2024-04-05".into(),
            status: None,
        }
    }

    #[test]
    fn test_valid_account_passes() {
        assert_eq!(valid().validate(), Ok(()));
    }

    #[test]
    fn test_validation_lists_every_missing_field() {
        let err = NewPaymentAccount::default().validate().unwrap_err();
        assert_eq!(
            err.fields,
            vec!["title", "supplier_name", "total_amount", "payment_date"]
        );
        assert_eq!(
            err.to_string(),
            "invalid payment account: title, supplier_name, total_amount, payment_date"
        );
    }

    #[test]
    fn test_non_positive_amount_and_bad_date_are_rejected() {
        let mut form = valid();
        form.total_amount = Some(0.0);
        form.payment_date = "05/04/2024".into();
        let err = form.validate().unwrap_err();
        assert_eq!(err.fields, vec!["total_amount", "payment_date"]);
    }

    #[test]
    fn test_deserialize_portuguese_field_names() {
        let json = r#"{
            "id": "pa-1",
            "titulo": "Energia",
            "fornecedor_nome": "CEMIG",
            "valor_total": "420,10",
            "data_vencimento": "2024-03-15",
            "payment_status": "pending"
        }"#;
        let account: PaymentAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.supplier_name(), Some("CEMIG"));
        assert_eq!(account.title(), Some("Energia"));
        assert_eq!(account.amount_or_zero(), 420.1);
        assert_eq!(account.scheduled_for(), Some("2024-03-15"));
        assert_eq!(account.parsed_status(), Some(PaymentStatus::Pending));
    }

    #[test]
    fn test_both_name_variants_in_one_record() {
        let json = r#"{
            "id": "pa-1",
            "status": "pending",
            "payment_status": "paid",
            "supplier_name": "Light S.A.",
            "fornecedor_nome": "CEMIG",
            "total_amount": 5,
            "valor_total": 10,
            "payment_date": "2024-03-01",
            "data_vencimento": "2024-03-15"
        }"#;
        let account: PaymentAccount = serde_json::from_str(json).unwrap();

        assert_eq!(account.status_code(), Some("paid"));
        assert_eq!(account.parsed_status(), Some(PaymentStatus::Paid));
        assert_eq!(account.amount_or_zero(), 5.0);
        assert_eq!(account.supplier_name(), Some("CEMIG"));
        assert_eq!(account.scheduled_for(), Some("2024-03-15"));

        let rows = vec![account];
        let by_status = |status: &str| {
            let filters = FilterState {
                status: status.into(),
                ..Default::default()
            };
            apply_filters(&rows, "", &filters).len()
        };
        assert_eq!(by_status("paid"), 1);
        assert_eq!(by_status("pending"), 0);
    }

    #[test]
    fn test_page_with_mixed_rows_loads() {
        let json = r#"{"data": [
            {"id": "a", "status": "pending", "payment_status": "overdue"},
            {"id": "b", "valor_total": "7,50", "total_amount": null}
        ]}"#;
        let page: PaymentAccountPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].parsed_status(), Some(PaymentStatus::Overdue));
        assert_eq!(page.data[1].amount_or_zero(), 7.5);
    }

    #[test]
    fn test_set_status_updates_the_winning_field() {
        let mut both = PaymentAccount {
            payment_status: Some("pending".into()),
            status: Some("pending".into()),
            ..Default::default()
        };
        both.set_status("paid");
        assert_eq!(both.payment_status.as_deref(), Some("paid"));
        assert_eq!(both.status.as_deref(), Some("paid"));

        let mut bare = PaymentAccount::default();
        bare.set_status("cancelled");
        assert_eq!(bare.status_code(), Some("cancelled"));
        assert_eq!(bare.payment_status, None);
    }
}
