use library_lending::{
    adapters::{memory::InMemoryLibraryStore, postgres::PostgresLibraryStore},
    api::{handlers::AppState, router::create_router},
    application::loan::ServiceDependencies,
    config::{AppConfig, StorageBackend},
    ports::LibraryStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_lending=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    // Initialize store
    let store: Arc<dyn LibraryStore> = match config.storage.backend {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to PostgreSQL");

            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&config.database.url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            Arc::new(PostgresLibraryStore::new(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on shutdown");
            Arc::new(InMemoryLibraryStore::new())
        }
    };

    // Create service dependencies
    let service_deps = ServiceDependencies { store };

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app).await?;

    Ok(())
}
