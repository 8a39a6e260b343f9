use anyhow::Context;
use studio_hq::api::routes::create_routes;
use studio_hq::config::{run_migrations, AppConfig, DatabaseConfig, DatabaseSeeder};
use studio_hq::state::AppState;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into())))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;

    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;

    let state = AppState::new(pool.clone(), &config.jwt_secret);
    let seeder = DatabaseSeeder::new(pool, state.changes.clone());

    if let Some((email, password)) = config.bootstrap_admin() {
        seeder.seed_admin(&state.auth, email, password).await?;
    }
    if config.seed_demo_data {
        if !config.is_development() {
            tracing::warn!("seeding demo content outside development");
        }
        seeder.seed_demo_content().await?;
    }

    let app = create_routes(state, &config.cors_allowed_origins);

    let address = config.server_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;
    info!("Studio HQ ({}) listening on http://{}", config.environment, address);
    info!("Health check available at http://{}/health", address);

    axum::serve(listener, app).await?;

    Ok(())
}
