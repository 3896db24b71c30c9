pub mod news;
use axum::{response::IntoResponse, response::Response, routing::get, Json, Router};
use http::StatusCode;
use serde_json::{json, Value};
use std::{any::Any, error::Error, sync::Arc};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt, Registry};

pub use news::news_routes;

use crate::{
    models::error::{envelope, error_response},
    utils::{config::Config, state::AppState},
};

pub fn init_tracing() {
    let log_level = std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase();

    let level = match log_level.as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    // Cargo turns the dash in the package name into an underscore for targets.
    let filter = filter::Targets::new()
        .with_target("tower_http::trace::on_response", Level::TRACE)
        .with_target("tower_http::trace::on_request", Level::TRACE)
        .with_target("tower_http::trace::make_span", Level::DEBUG)
        .with_target("axum::rejection", Level::TRACE)
        .with_target(env!("CARGO_CRATE_NAME"), level)
        .with_default(Level::INFO);

    let tracing_layer = tracing_subscriber::fmt::layer();

    Registry::default().with(tracing_layer).with(filter).init();
}

pub fn make_app(config: Config) -> Result<Router, Box<dyn Error>> {
    info!("Initializing application...");
    if config.gnews_api_key.is_none() {
        error!("GNEWS_API_KEY is not set; news requests will fail with 500");
    }
    info!(
        backend = ?config.cache_backend,
        dir = %config.cache_dir.display(),
        ttl_secs = config.cache_ttl_secs,
        "Cache configured"
    );

    let state = Arc::new(AppState::init(config)?);
    info!("External clients initialized successfully");

    let app = router(state);
    info!("Application initialized successfully");

    Ok(app)
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(news_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"message": "ok"}))).into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!(details = %details, "request handler panicked");

    let status = StatusCode::INTERNAL_SERVER_ERROR;
    error_response(status, envelope(status, "Server error", Value::String(details)))
}
