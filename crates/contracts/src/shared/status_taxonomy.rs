//! Отображение кодов статусов заказов и платежей.

use serde::{Deserialize, Serialize};

/// Серый цвет для неизвестных кодов
pub const DEFAULT_STATUS_COLOR: &str = "#6b7280";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDisplay {
    pub label: String,
    pub color: String,
}

const KNOWN: &[(&str, &str, &str)] = &[
    // orders
    ("pending", "Pendente", "#f59e0b"),
    ("approved", "Aprovado", "#3b82f6"),
    ("in_progress", "Em andamento", "#6366f1"),
    ("shipped", "Enviado", "#8b5cf6"),
    ("delivered", "Entregue", "#10b981"),
    ("cancelled", "Cancelado", "#ef4444"),
    ("backout", "Estornado", "#f97316"),
    // payments
    ("paid", "Pago", "#10b981"),
    ("overdue", "Vencido", "#dc2626"),
    ("due_today", "Vence hoje", "#eab308"),
];

/// Подпись и цвет кода статуса. Поиск точный; неизвестный код получает
/// подпись из самого кода и [`DEFAULT_STATUS_COLOR`].
pub fn status_display(code: &str) -> StatusDisplay {
    match KNOWN.iter().find(|(known, _, _)| *known == code) {
        Some((_, label, color)) => StatusDisplay {
            label: label.to_string(),
            color: color.to_string(),
        },
        None => StatusDisplay {
            label: fallback_label(code),
            color: DEFAULT_STATUS_COLOR.to_string(),
        },
    }
}

/// `"awaiting_stock"` -> `"Awaiting stock"`
fn fallback_label(code: &str) -> String {
    let spaced = code.trim().replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Desconhecido".to_string(),
    }
}
