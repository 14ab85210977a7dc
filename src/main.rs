use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod dto;
mod error;
mod estimator;
mod handlers;
mod ledger;
mod models;
mod resolver;
mod store;

use config::Config;
use estimator::{ClaudeEstimator, Estimator};
use ledger::{LedgerEvent, SharedLedger};
use resolver::FoodResolver;
use store::{FoodStore, PgFoodStore};

#[derive(Clone)]
pub struct AppState {
    pub db: Option<PgPool>,
    pub config: Arc<Config>,
    pub store: Option<Arc<dyn FoodStore>>,
    pub resolver: Arc<FoodResolver>,
    pub ledger: SharedLedger,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/ws", get(handlers::ws::ws_handler))
        // Foods
        .route("/api/foods/ensure", post(handlers::foods::ensure_food))
        .route("/api/foods/search", get(handlers::foods::search_foods))
        // Entries
        .route("/api/entries", post(handlers::entries::create_entry))
        .route("/api/entries", get(handlers::entries::list_entries))
        .route("/api/entries/:id", delete(handlers::entries::delete_entry))
        .with_state(state)
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutrilog_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Config::from_env();
    let config = Arc::new(config);

    // Database (optional: the service degrades to a store-less mode)
    let db = db::try_create_pool(config.database_url.as_deref()).await;

    if let Some(pool) = &db {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("Database migrations applied");
    } else {
        tracing::warn!("No database configured; food persistence and search run degraded");
    }

    let store: Option<Arc<dyn FoodStore>> = db
        .clone()
        .map(|pool| Arc::new(PgFoodStore::new(pool)) as Arc<dyn FoodStore>);

    let estimator: Option<Arc<dyn Estimator>> =
        match ClaudeEstimator::new(&config.claude_api_key, &config.claude_model) {
            Ok(est) => Some(Arc::new(est) as Arc<dyn Estimator>),
            Err(err) => {
                tracing::warn!(error = %err, "nutrition estimator disabled");
                None
            }
        };

    let resolver = Arc::new(
        FoodResolver::new(store.clone(), estimator)
            .with_fallback_calories(config.fallback_calories_per_100g),
    );

    // Ledger event broadcast channel
    let (event_tx, _) = broadcast::channel::<LedgerEvent>(256);
    let ledger = SharedLedger::new(event_tx);

    let state = AppState {
        db,
        config: config.clone(),
        store,
        resolver,
        ledger,
    };

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .unwrap()];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
