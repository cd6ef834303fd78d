pub mod api;
pub mod crm;
pub mod dashboards;
pub mod routes;
pub mod shared;
pub mod system;

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::http::{header, Method};
    use axum::middleware;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    use crate::crm::message_counts::FileMessageCounts;
    use crate::dashboards::d100_finance::service::FinanceService;
    use crate::shared::clock::SystemClock;
    use crate::shared::status_policy::StatusPolicy;
    use crate::shared::upstream::RestFinanceApi;

    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let tz = config.finance.tz()?;
    tracing::info!(
        "Upstream API: {} (timeout {}s), business timezone {}",
        config.upstream.base_url,
        config.upstream.timeout_secs,
        tz
    );

    let api = RestFinanceApi::new(&config.upstream)
        .map_err(|e| anyhow::anyhow!("upstream client init failed: {e}"))?;
    let finance = FinanceService::new(
        Arc::new(api),
        Arc::new(SystemClock),
        StatusPolicy::new(config.finance.unknown_status_fallback),
        tz,
        config.finance.page_limit,
    );
    let message_counts =
        FileMessageCounts::new(shared::config::resolve_path(&config.crm.message_counts_path));

    let state = routes::AppState {
        finance: Arc::new(finance),
        message_counts: Arc::new(message_counts),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let app = routes::configure_routes(state)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let port = config.server.port;
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
