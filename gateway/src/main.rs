use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nri_data::{schema, Database};
use risk_ranking::StateLookup;

mod routes;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub lookup: Arc<StateLookup>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "risk_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_path = std::env::var("RISK_DB_PATH").unwrap_or_else(|_| "data/airisk.db".to_string());
    let db = Database::new(&db_path);

    // Tables created on boot; the batch loaders fill them
    {
        let conn = db.connect()?;
        schema::init(&conn)?;
    }
    tracing::info!("   Database ready at {}", db_path);

    let state = AppState {
        db: Arc::new(db),
        lookup: Arc::new(StateLookup::default()),
    };

    let app = Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/api/search", post(routes::search))
        .route("/api/suggest", get(routes::suggest))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("RISK_GATEWAY_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "8000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    tracing::info!("Risk gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
