use anyhow::{Context, Result};
use axum::Router;
use glowcart_api::clients::{
    HttpAddressApi, HttpCashfreeApi, HttpMilestoneApi, HttpOrderApi, HttpServiceabilityApi,
    HttpWalletApi,
};
use glowcart_api::config::{init_tracing, load_config};
use glowcart_api::events::{process_events, EventSender};
use glowcart_api::handlers::api_router;
use glowcart_api::services::{
    CheckoutService, DiscountAggregator, LocationService, PaymentSubmission, ShippingResolver,
    WalletManager,
};
use glowcart_api::session::{InMemorySessionStore, SessionStore};
use glowcart_api::AppState;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);
    info!(
        "Starting glowcart-api in {} mode on {}:{}",
        config.environment, config.host, config.port
    );

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()
        .context("failed to build HTTP client")?;
    let base_url = config.commerce_api_url.trim_end_matches('/').to_string();

    let addresses = Arc::new(HttpAddressApi::new(http.clone(), base_url.clone()));
    let serviceability = Arc::new(HttpServiceabilityApi::new(http.clone(), base_url.clone()));
    let wallet_api = Arc::new(HttpWalletApi::new(http.clone(), base_url.clone()));
    let milestones = Arc::new(HttpMilestoneApi::new(http.clone(), base_url.clone()));
    let gateway = Arc::new(HttpCashfreeApi::new(http.clone(), base_url.clone()));
    let orders = Arc::new(HttpOrderApi::new(http, base_url));

    let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let events = EventSender::new(event_tx);
    tokio::spawn(process_events(event_rx));

    let sessions = SessionStore::new(
        Arc::new(InMemorySessionStore::new()),
        Some(Duration::from_secs(config.session_ttl_secs)),
    );

    let wallet = WalletManager::new(
        wallet_api,
        sessions.clone(),
        events.clone(),
        config.wallet_expiry_poll_secs,
    );
    let checkout = CheckoutService::new(
        sessions,
        events.clone(),
        DiscountAggregator::new(milestones),
        ShippingResolver::new(
            serviceability.clone(),
            config.free_shipping_threshold,
            config.fallback_shipping_rate,
            config.parcel_weight_per_unit,
        ),
        wallet,
    );
    let payments = PaymentSubmission::new(
        checkout.clone(),
        addresses.clone(),
        orders,
        gateway,
        events,
        config.cashfree.clone(),
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        checkout,
        payments,
        location: LocationService::new(
            serviceability,
            Duration::from_millis(config.pincode_debounce_ms),
        ),
        addresses,
    });

    let app = Router::new()
        .nest("/api/v1", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
