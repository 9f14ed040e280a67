use std::sync::{Arc, Mutex};

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use salon::config::AppConfig;
use salon::db;
use salon::handlers;
use salon::services::mailer::mailgun::MailgunMailer;
use salon::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.mailgun_domain.is_empty() {
        tracing::warn!("MAILGUN_DOMAIN not set, booking emails will fail and be logged");
    }
    let mailer = MailgunMailer::new(
        config.mailgun_domain.clone(),
        config.mailgun_api_key.clone(),
        config.mail_from.clone(),
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        mailer: Box::new(mailer),
    });

    let app = Router::new()
        .route("/", get(handlers::public::index_page))
        .route("/dashboard", get(handlers::public::dashboard_page))
        .route("/health", get(handlers::health::health))
        .route("/api/home", get(handlers::public::get_home))
        .route("/api/services", get(handlers::public::get_services))
        .route("/api/portfolio", get(handlers::public::get_portfolio))
        .route("/api/availability", get(handlers::booking::get_availability))
        .route("/api/bookings", post(handlers::booking::submit_booking))
        .route("/api/dashboard/summary", get(handlers::dashboard::get_summary))
        .route(
            "/api/dashboard/appointments",
            get(handlers::dashboard::list_appointments),
        )
        .route(
            "/api/dashboard/appointments/:id",
            get(handlers::dashboard::get_appointment),
        )
        .route(
            "/api/dashboard/appointments/:id/status",
            post(handlers::dashboard::update_status),
        )
        .route("/api/dashboard/clients", get(handlers::dashboard::get_clients))
        .route(
            "/api/dashboard/analytics",
            get(handlers::dashboard::get_analytics),
        )
        .route(
            "/api/dashboard/schedule",
            get(handlers::dashboard::get_schedule).put(handlers::dashboard::put_schedule),
        )
        .route(
            "/api/dashboard/services",
            get(handlers::dashboard::list_services).post(handlers::dashboard::create_service),
        )
        .route(
            "/api/dashboard/services/:id",
            patch(handlers::dashboard::update_service),
        )
        .route(
            "/api/dashboard/portfolio",
            post(handlers::dashboard::create_portfolio_item),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
