use std::sync::Arc;

use account_service::account::service::AccountService;
use account_service::config::Config;
use account_service::inbound::http::router::create_router;
use account_service::inbound::http::router::HttpSettings;
use account_service::outbound::identity::GoogleIdentityProvider;
use account_service::outbound::notifications::EmailNotifier;
use account_service::repositories::PostgresAccountRepository;
use auth::InMemoryRevocationList;
use auth::PasswordHasher;
use auth::TokenService;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    tracing::info!(
        http_port = config.server.http_port,
        max_connections = config.database.max_connections,
        require_email_verification = config.auth.require_email_verification,
        frontend_url = %config.auth.frontend_url,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.timeout())
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let tokens = Arc::new(TokenService::new(
        config.jwt.secret.trim().as_bytes(),
        config.jwt.lifetimes(),
        Arc::new(InMemoryRevocationList::new()),
    )?);
    let password_hasher = PasswordHasher::with_cost(
        config.password.memory_kib,
        config.password.iterations,
        config.password.parallelism,
    )?;

    let account_repository = Arc::new(PostgresAccountRepository::new(
        pg_pool,
        config.database.timeout(),
    ));
    let notifier = Arc::new(EmailNotifier::new(&config.email, &config.auth)?);
    let identity_provider = Arc::new(GoogleIdentityProvider::new(config.google.clone())?);

    let account_service = Arc::new(AccountService::new(
        account_repository,
        notifier,
        identity_provider,
        Arc::clone(&tokens),
        password_hasher,
        config.auth.require_email_verification,
    )?);

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(
        account_service,
        tokens,
        config.validation.policy(),
        HttpSettings {
            frontend_url: config.auth.frontend_url.clone(),
            cors_allowed_origins: config.server.cors_allowed_origins.clone(),
        },
    );

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");
    Ok(())
}
