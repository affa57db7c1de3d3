// CashTrackr API server
// Decision: PostgreSQL when DATABASE_URL is set, otherwise an in-memory store (dev mode)
// Decision: SMTP when EMAIL_HOST/EMAIL_USER/EMAIL_PASS are set, otherwise emails are logged

use anyhow::{Context, Result};
use cashtrackr_api::{
    app,
    config::AppConfig,
    email::{LogMailer, Mailer, SmtpMailer},
    rate_limit::spawn_cleanup,
    telemetry::init_tracing,
    AppState,
};
use cashtrackr_storage::StorageBackend;
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();
    tracing::info!("cashtrackr-api starting...");

    let config = AppConfig::from_env().context("Invalid configuration")?;
    tracing::info!(
        environment = ?config.environment,
        rate_limit = config.rate_limit.max_requests,
        "Configuration loaded"
    );

    let db = match &config.database_url {
        Some(url) => {
            let db = StorageBackend::postgres(url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");
            db
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on exit)");
            StorageBackend::in_memory()
        }
    };
    let db = Arc::new(db);

    let mailer: Arc<dyn Mailer> = match &config.email.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "SMTP configured");
            Arc::new(SmtpMailer::new(smtp, &config.email).context("Invalid SMTP settings")?)
        }
        None => {
            tracing::info!("SMTP not configured, emails will be logged");
            Arc::new(LogMailer::new(config.email.frontend_url.clone()))
        }
    };

    let state = AppState::new(&config, db, mailer);
    let cleanup = spawn_cleanup(state.rate_limiter.clone());
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;
    tracing::info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    cleanup.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
