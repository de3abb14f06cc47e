use axum::extract::State;
use axum::{http::Method, response::Json, routing::get, Router};
use chrono::Utc;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

mod config;
mod database;
mod errors;
mod handlers;
mod middleware;
mod models;
mod routes;
mod seed;
mod services;
mod state;

use config::AppConfig;
use database::connection::{ensure_indexes, get_db_client};
use state::AppState;

const OTP_SWEEP_INTERVAL_SECS: u64 = 60;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env();

    let db = match get_db_client(&config.mongodb_uri).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Invalid MongoDB connection string: {}", e);
            std::process::exit(1);
        }
    };

    if std::env::args().nth(1).as_deref() == Some("seed") {
        match seed::seed_initial_users(&db).await {
            Ok(()) => tracing::info!("Initial users created successfully"),
            Err(e) => {
                tracing::error!("Error creating initial users: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    ensure_indexes(&db).await;

    let app_state = match AppState::new(db, &config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("Failed to initialize services: {}", e);
            std::process::exit(1);
        }
    };

    spawn_otp_sweeper(app_state.otp_store.clone());

    let app = build_router(app_state);
    start_server(app, config.port).await;
}

/// Pending reset codes are checked lazily on confirm; this task reclaims
/// the ones that were never confirmed so they do not pile up in memory.
fn spawn_otp_sweeper(store: services::otp_store::OtpStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(OTP_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let removed = store.sweep(Utc::now());
            if removed > 0 {
                tracing::debug!("swept {} expired OTP entries", removed);
            }
        }
    });
}

fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/health", get(api_health_check))
        .nest("/api/auth", routes::auth::routes(app_state.clone()))
        .nest("/api", routes::marks::routes(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

async fn start_server(app: Router, port: u16) {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!("Server running on {}", addr);

    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn api_health_check(State(state): State<AppState>) -> Json<Value> {
    use mongodb::bson::doc;

    let db_status = match state.db.run_command(doc! { "ping": 1 }).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    Json(json!({
        "status": "healthy",
        "database": db_status,
        "pending_otps": state.otp_store.pending_count(),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
