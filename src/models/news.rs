use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Reduced view of a GNews article, as served to clients and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub source: Option<String>,
}

impl Article {
    fn from_upstream(article: &Value) -> Self {
        let text = |field: &str| article[field].as_str().map(str::to_string);
        // GNews nests the outlet as `{ name, url }`; some mirrors send a bare string.
        let source = match &article["source"] {
            Value::String(name) => Some(name.clone()),
            other => other["name"].as_str().map(str::to_string),
        };

        Self {
            title: text("title"),
            description: text("description"),
            url: text("url"),
            image: text("image"),
            published_at: text("publishedAt"),
            source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArticleList {
    pub articles: Vec<Article>,
}

impl ArticleList {
    /// Projects a successful upstream body. A body that is not JSON, or has no
    /// `articles` array, yields an empty list.
    pub fn from_upstream_body(body: &str) -> Self {
        let parsed: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "upstream returned malformed JSON; serving empty article list");
                return Self::default();
            }
        };

        let articles = parsed["articles"]
            .as_array()
            .map(|items| items.iter().map(Article::from_upstream).collect())
            .unwrap_or_default();

        Self { articles }
    }
}
