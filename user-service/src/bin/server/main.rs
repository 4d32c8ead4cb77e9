use std::sync::Arc;
use std::time::Duration;

use auth::HashingParams;
use auth::JwtHandler;
use auth::PasswordHasher;
use auth::TokenService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::user::service::AuthService;
use user_service::inbound::http::router::create_router;
use user_service::outbound::events::AuthEventNotifier;
use user_service::outbound::events::KafkaEventProducer;
use user_service::outbound::events::NotifierSettings;
use user_service::outbound::repositories::PostgresUserRepository;

const NOTIFIER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        kafka_brokers = %config.kafka.brokers,
        kafka_topic = %config.kafka.topic,
        token_ttl_hours = config.jwt.expiration_hours,
        request_timeout_ms = config.service.request_timeout_ms,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let mut jwt_handler = JwtHandler::new(config.jwt.secret.as_bytes());
    if let Some(previous) = &config.jwt.previous_secret {
        jwt_handler = jwt_handler.with_previous(previous.as_bytes());
        tracing::info!("Previous signing key loaded for rotation");
    }
    let token_service = Arc::new(TokenService::new(jwt_handler, config.jwt.expiration_hours));

    let password_hasher = PasswordHasher::with_params(HashingParams::from(&config.password))?;

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let event_producer = Arc::new(KafkaEventProducer::new(&config.kafka)?);
    let (notifier, notifier_handle) =
        AuthEventNotifier::spawn(event_producer, NotifierSettings::from(&config.events));

    let auth_service = AuthService::new(user_repository, Arc::new(notifier), token_service)
        .with_password_hasher(password_hasher)
        .with_request_timeout(config.service.request_timeout());

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(Arc::new(auth_service));
    axum::serve(http_listener, http_application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router held the last notifier handle; the worker now drains what is queued.
    match tokio::time::timeout(NOTIFIER_DRAIN_TIMEOUT, notifier_handle).await {
        Ok(Ok(())) => tracing::info!("Auth event queue drained"),
        Ok(Err(e)) => tracing::error!(error = %e, "Auth event notifier failed"),
        Err(_) => tracing::warn!("Auth event queue not drained before shutdown"),
    }

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
