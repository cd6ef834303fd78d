use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;

use crate::routes::AppState;

/// GET /api/crm/message-counts
pub async fn get_message_counts(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match state.message_counts.current() {
        Ok(counts) => Ok(Json(json!({
            "channels": counts.channels,
            "unread": counts.unread,
            "total": counts.total(),
        }))),
        Err(e) => {
            tracing::error!("CRM: failed to read message counts: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
