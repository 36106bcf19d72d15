use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::{
    AppState, MIGRATOR,
    config::AppConfig,
    jwt::JwtService,
    repositories::UserRepository,
    routes,
    service::AuthService,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.environment.default_log_filter()));
    if config.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    info!(environment = %config.environment, "Starting authentication service");

    // Initialize database connection pool
    let pool = common::init_pool(&config.database).await?;

    // Check database connectivity
    if common::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    common::run_migrations(&pool, &MIGRATOR).await?;

    let jwt_service = JwtService::new(&config.jwt)?;
    let user_repository = UserRepository::new(pool);
    let auth_service = AuthService::new(Arc::new(user_repository), jwt_service);

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(AppState::new(auth_service));

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Authentication service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
