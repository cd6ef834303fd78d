use axum::body::{to_bytes, Body};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use contracts::shared::format::format_number_with_decimals;
use contracts::shared::timezone::BUSINESS_TZ;

/// Middleware для логирования HTTP запросов
///
/// Одна строка на запрос: время (America/Sao_Paulo), длительность,
/// размер ответа, статус, метод и путь.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();
    let timestamp = Utc::now().with_timezone(&BUSINESS_TZ);

    // Тело читается целиком, чтобы узнать реальный размер
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("{} {}: cannot read response body: {}", method, path, e);
            println!(
                "\x1b[33m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
                timestamp.format("%H:%M:%S"),
                start.elapsed().as_millis(),
                "error",
                parts.status.as_u16(),
                method,
                path
            );
            return Response::from_parts(parts, Body::default());
        }
    };

    let color_code = if parts.status.is_success() { "36" } else { "33" };

    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        timestamp.format("%H:%M:%S"),
        start.elapsed().as_millis(),
        format_number_with_decimals(bytes.len() as f64, 0),
        parts.status.as_u16(),
        method,
        path
    );

    Response::from_parts(parts, Body::from(bytes))
}
