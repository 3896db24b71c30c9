use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Duration;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    models::{
        error::Error,
        news::ArticleList,
        query::{NewsParams, NewsQuery},
    },
    store::CacheStore,
    utils::state::AppState,
};

pub const CACHE_CONTROL: &str = "public, max-age=60";
pub const X_CACHE: &str = "x-cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    fn as_str(self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsResponse {
    pub articles: ArticleList,
    pub cache: CacheStatus,
}

impl IntoResponse for NewsResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::OK,
            [
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::CACHE_CONTROL, CACHE_CONTROL),
                (HeaderName::from_static(X_CACHE), self.cache.as_str()),
            ],
            Json(self.articles),
        )
            .into_response()
    }
}

// A plain map never rejects: repeated keys keep the last value.
pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<NewsResponse, Error> {
    let api_key = state.config.gnews_api_key.clone();
    let query = NewsQuery::from_params(&NewsParams::from_map(&params));
    handle(&state, api_key.as_deref(), &query).await
}

/// Serves `query` from the cache when a fresh entry exists, otherwise fetches
/// it from GNews, projects the articles and stores them for later requests.
pub async fn handle(
    state: &AppState,
    api_key: Option<&str>,
    query: &NewsQuery,
) -> Result<NewsResponse, Error> {
    let api_key = api_key.ok_or(Error::MissingApiKey)?;
    let key = query.cache_key();
    let ttl = state.config.cache_ttl();

    if let Some(articles) = read_cached(state.store.as_ref(), &key, ttl).await {
        debug!(key = %key, topic = %query.topic, "news cache hit");
        return Ok(NewsResponse {
            articles,
            cache: CacheStatus::Hit,
        });
    }
    debug!(key = %key, topic = %query.topic, "news cache miss");

    let body = fetch_upstream(state, api_key, query).await?;
    let articles = ArticleList::from_upstream_body(&body);
    write_cached(state.store.as_ref(), &key, &articles).await;

    info!(
        key = %key,
        endpoint = query.request.endpoint(),
        count = articles.articles.len(),
        "fetched news from upstream"
    );
    Ok(NewsResponse {
        articles,
        cache: CacheStatus::Miss,
    })
}

async fn read_cached(store: &dyn CacheStore, key: &str, ttl: Duration) -> Option<ArticleList> {
    let payload = match store.get_fresh(key, ttl).await {
        Ok(Some(payload)) => payload,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "cache read failed, treating as miss");
            return None;
        }
    };

    match serde_json::from_str(&payload) {
        Ok(articles) => Some(articles),
        Err(e) => {
            warn!(key, error = %e, "cached payload unreadable, treating as miss");
            None
        }
    }
}

async fn write_cached(store: &dyn CacheStore, key: &str, articles: &ArticleList) {
    let payload = match serde_json::to_string(articles) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(key, error = %e, "could not serialize articles for cache");
            return;
        }
    };
    if let Err(e) = store.set(key, &payload).await {
        warn!(key, error = %e, "cache write failed, skipping");
    }
}

async fn fetch_upstream(
    state: &AppState,
    api_key: &str,
    query: &NewsQuery,
) -> Result<String, Error> {
    let url = format!(
        "{}{}",
        state.config.gnews_base_url.trim_end_matches('/'),
        query.request.endpoint()
    );

    let res = state
        .http_client
        .get(url)
        .query(&query.upstream_params(api_key))
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        warn!(%status, endpoint = query.request.endpoint(), "upstream returned an error");
        let details = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
        return Err(Error::Upstream { status, details });
    }
    Ok(text)
}
