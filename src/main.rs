use locations_api::{config::Settings, routes, state::AppState, store};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("locations_api=info".parse()?),
        )
        .init();

    let settings = Settings::from_env();
    let options =
        SqliteConnectOptions::from_str(&settings.database_url)?.create_if_missing(true);
    let pool = SqlitePool::connect_with(options).await?;
    store::ensure_schema(&pool).await?;

    let bind_addr = settings.bind_addr.clone();
    let state = AppState {
        pool,
        settings: Arc::new(settings),
    };
    let app = routes::router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
