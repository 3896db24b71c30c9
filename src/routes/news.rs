use std::sync::Arc;

use axum::{routing::get, Router};

use crate::{handlers::news::get_news, utils::state::AppState};

/// Path the endpoint was served under as a Netlify function.
pub const LEGACY_NEWS_PATH: &str = "/.netlify/functions/news";

pub fn news_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/news", get(get_news))
        .route(LEGACY_NEWS_PATH, get(get_news))
}
