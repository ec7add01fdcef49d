use foodshare_backend::api::{self, AppState};
use foodshare_backend::auth::{AuthProvider, JwtAuthProvider, SupabaseAuthProvider};
use foodshare_backend::config::AppConfig;
use foodshare_backend::database::{
    init_pool_from_config, RestTransactionRepository, TransactionRepository, TransactionStore,
};
use foodshare_backend::logging::init_tracing;
use foodshare_backend::payments::providers::IntaSendProvider;
use foodshare_backend::payments::PaymentProvider;
use foodshare_backend::services::{PaymentProcessor, TransactionRecorder};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    init_tracing(&config.logging);
    config.validate()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting foodshare payment service"
    );

    let auth: Arc<dyn AuthProvider> = match config.supabase.jwt_secret.as_deref() {
        Some(secret) => {
            info!("Verifying session tokens locally (HS256)");
            Arc::new(JwtAuthProvider::new(secret))
        }
        None => {
            info!(url = %config.supabase.url, "Verifying session tokens against the auth server");
            Arc::new(SupabaseAuthProvider::new(&config.supabase)?)
        }
    };

    if !config.intasend.has_credentials() {
        warn!("IntaSend credentials not configured; payment requests will be rejected");
    }
    let gateway: Arc<dyn PaymentProvider> = Arc::new(IntaSendProvider::new(config.intasend.clone())?);

    let (store, db_pool) = match &config.database {
        Some(db_config) => {
            info!("Initializing database connection pool...");
            let pool = init_pool_from_config(db_config).await.map_err(|e| {
                error!("Failed to initialize database pool: {}", e);
                e
            })?;
            info!(
                max_connections = pool.options().get_max_connections(),
                "Database connection pool initialized"
            );
            (
                Arc::new(TransactionRepository::new(pool.clone())) as Arc<dyn TransactionStore>,
                Some(pool),
            )
        }
        None => {
            let service_role_key = config.supabase.service_role_key.as_deref().ok_or_else(|| {
                anyhow::anyhow!("SUPABASE_SERVICE_ROLE_KEY is required without DATABASE_URL")
            })?;
            info!("Recording transactions through the REST endpoint");
            (
                Arc::new(RestTransactionRepository::new(
                    &config.supabase.url,
                    service_role_key,
                )?) as Arc<dyn TransactionStore>,
                None,
            )
        }
    };

    let processor = PaymentProcessor::new(
        auth,
        gateway,
        TransactionRecorder::new(store),
        config.intasend.default_host.clone(),
    );

    let app = api::router(AppState {
        processor: Arc::new(processor),
        db_pool,
    });

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind to address {}: {}", addr, e);
        e
    })?;

    println!("\n  foodshare payment service listening on http://{}", addr);
    println!("    POST {}", api::PROCESS_PAYMENT_PATH);
    println!("    GET  {}", api::TRANSACTIONS_PATH);
    println!("    GET  {}\n", api::HEALTH_PATH);

    info!(address = %addr, "Server is ready to accept connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
