//! Stall POS - point-of-sale service for a seasonal food stall

use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use stall_pos::api::{self, AppState};
use stall_pos::service::CheckoutService;
use stall_pos::store::{CatalogStore, CategoryStore, LocalImageStore, MemoryStore, PgStore, SalesStore};
use stall_pos::Config;
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();
    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let (catalog, categories, sales) = match &config.database_url {
        Some(url) => {
            let db = PgPoolOptions::new().max_connections(config.db_max_connections).connect(url).await?;
            sqlx::migrate!("./migrations").run(&db).await?;
            let store = Arc::new(PgStore::new(db));
            (store.clone() as Arc<dyn CatalogStore>, store.clone() as Arc<dyn CategoryStore>, store as Arc<dyn SalesStore>)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            (store.clone() as Arc<dyn CatalogStore>, store.clone() as Arc<dyn CategoryStore>, store as Arc<dyn SalesStore>)
        }
    };

    tokio::fs::create_dir_all(&config.image_dir).await?;
    let state = AppState {
        catalog,
        categories,
        sales: sales.clone(),
        images: Arc::new(LocalImageStore::new(&config.image_dir, &config.image_base_url)),
        checkout: CheckoutService::new(&config.currency, sales, config.confirmation_display),
        password: Arc::from(config.password.as_str()),
    };

    let app = api::router(state).nest_service("/images", ServeDir::new(&config.image_dir));

    tracing::info!("🎪 Stall POS listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
