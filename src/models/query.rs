use std::collections::HashMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_LANG: &str = "es";
pub const DEFAULT_COUNTRY: &str = "ar";

/// Topic used for the cache key and upstream call when `q` is empty.
const GENERAL_TOPIC: &str = "general";

/// Raw query string of the news endpoint. Everything stays a string so that
/// a bad `pageSize` falls back to the default instead of rejecting the request.
#[derive(Debug, Default)]
pub struct NewsParams {
    pub q: Option<String>,
    pub page_size: Option<String>,
    pub country: Option<String>,
    pub lang: Option<String>,
}

impl NewsParams {
    pub fn from_map(params: &HashMap<String, String>) -> Self {
        Self {
            q: params.get("q").cloned(),
            page_size: params.get("pageSize").cloned(),
            country: params.get("country").cloned(),
            lang: params.get("lang").cloned(),
        }
    }
}

/// Top-headline categories supported by GNews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Business,
        Category::Entertainment,
        Category::General,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::General => "general",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }

    /// Resolves a normalized (trimmed, lower-cased) topic to a category,
    /// either by its canonical id or by a Spanish alias.
    pub fn resolve(topic: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == topic)
            .or_else(|| Self::from_alias(topic))
    }

    fn from_alias(topic: &str) -> Option<Self> {
        match topic {
            "negocios" | "economía" | "economia" => Some(Category::Business),
            "entretenimiento" | "espectáculos" | "espectaculos" => Some(Category::Entertainment),
            "generales" | "portada" => Some(Category::General),
            "salud" => Some(Category::Health),
            "ciencia" => Some(Category::Science),
            "deportes" => Some(Category::Sports),
            "tecnología" | "tecnologia" => Some(Category::Technology),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewsRequest {
    Headlines { category: Category, country: String },
    Search { term: String },
}

impl NewsRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            NewsRequest::Headlines { .. } => "/top-headlines",
            NewsRequest::Search { .. } => "/search",
        }
    }
}

/// A normalized news query, ready for key derivation and the upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsQuery {
    /// Trimmed, lower-cased topic with aliases replaced by the canonical id.
    pub topic: String,
    pub lang: String,
    pub page_size: u32,
    pub request: NewsRequest,
}

impl NewsQuery {
    pub fn from_params(params: &NewsParams) -> Self {
        let raw = params.q.as_deref().unwrap_or("").trim();
        let lowered = raw.to_lowercase();
        let country = param_or(params.country.as_deref(), DEFAULT_COUNTRY);

        let (topic, request) = if lowered.is_empty() {
            (
                String::new(),
                NewsRequest::Headlines {
                    category: Category::General,
                    country,
                },
            )
        } else if let Some(category) = Category::resolve(&lowered) {
            (
                category.as_str().to_string(),
                NewsRequest::Headlines { category, country },
            )
        } else {
            (
                lowered,
                NewsRequest::Search {
                    term: raw.to_string(),
                },
            )
        };

        Self {
            topic,
            lang: param_or(params.lang.as_deref(), DEFAULT_LANG),
            page_size: parse_page_size(params.page_size.as_deref()),
            request,
        }
    }

    /// URL-safe key for `{topic}_{page_size}`, with an empty topic stored as `general`.
    pub fn cache_key(&self) -> String {
        let topic = if self.topic.is_empty() {
            GENERAL_TOPIC
        } else {
            &self.topic
        };
        URL_SAFE_NO_PAD.encode(format!("{topic}_{}", self.page_size))
    }

    pub fn upstream_params(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("apikey", api_key.to_string()),
            ("lang", self.lang.clone()),
            ("max", self.page_size.to_string()),
        ];
        match &self.request {
            NewsRequest::Headlines { category, country } => {
                params.push(("category", category.as_str().to_string()));
                params.push(("country", country.clone()));
            }
            NewsRequest::Search { term } => params.push(("q", term.clone())),
        }
        params
    }
}

/// Reads the leading integer of `raw` the way `parseInt` does (`"7.5"` is 7,
/// `"5px"` is 5) and clamps it into `1..=MAX_PAGE_SIZE`. Input without a
/// leading integer gets the default.
pub fn parse_page_size(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_PAGE_SIZE;
    };
    let (negative, rest) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return DEFAULT_PAGE_SIZE;
    }

    match digits.parse::<u64>() {
        Ok(n) if !negative => n.clamp(1, MAX_PAGE_SIZE as u64) as u32,
        Ok(_) => 1,
        // Too many digits for u64: saturate on the side of the sign.
        Err(_) if negative => 1,
        Err(_) => MAX_PAGE_SIZE,
    }
}

fn param_or(raw: Option<&str>, default: &str) -> String {
    match raw.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_lowercase(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(q: Option<&str>, page_size: Option<&str>) -> NewsParams {
        NewsParams {
            q: q.map(String::from),
            page_size: page_size.map(String::from),
            ..Default::default()
        }
    }

    fn key_of(raw: &str) -> String {
        URL_SAFE_NO_PAD.encode(raw)
    }

    #[test]
    fn canonical_ids_select_headlines() {
        for category in Category::ALL {
            let query = NewsQuery::from_params(&params(Some(category.as_str()), None));
            assert_eq!(
                query.request,
                NewsRequest::Headlines {
                    category,
                    country: DEFAULT_COUNTRY.to_string()
                }
            );
        }
    }

    #[test]
    fn aliases_resolve_to_canonical_category() {
        let cases = [
            ("salud", Category::Health),
            ("  Deportes ", Category::Sports),
            ("TECNOLOGÍA", Category::Technology),
            ("tecnologia", Category::Technology),
            ("economía", Category::Business),
            ("espectáculos", Category::Entertainment),
            ("ciencia", Category::Science),
        ];
        for (raw, expected) in cases {
            let query = NewsQuery::from_params(&params(Some(raw), None));
            assert_eq!(query.topic, expected.as_str(), "topic for {raw:?}");
            assert!(
                matches!(query.request, NewsRequest::Headlines { category, .. } if category == expected),
                "request for {raw:?}"
            );
        }
    }

    #[test]
    fn free_text_selects_search_with_raw_term() {
        let query = NewsQuery::from_params(&params(Some("  Bitcoin ETF "), None));
        assert_eq!(
            query.request,
            NewsRequest::Search {
                term: "Bitcoin ETF".to_string()
            }
        );
        assert_eq!(query.topic, "bitcoin etf");
    }

    #[test]
    fn near_miss_category_names_are_searched_not_defaulted() {
        for raw in ["sport", "healthcare", "santé", "gesundheit"] {
            let query = NewsQuery::from_params(&params(Some(raw), None));
            assert!(
                matches!(query.request, NewsRequest::Search { .. }),
                "{raw:?} should be a search"
            );
        }
    }

    #[test]
    fn empty_topic_defaults_to_general_headlines() {
        for q in [None, Some(""), Some("   ")] {
            let query = NewsQuery::from_params(&params(q, None));
            assert!(matches!(
                query.request,
                NewsRequest::Headlines {
                    category: Category::General,
                    ..
                }
            ));
            assert_eq!(query.cache_key(), key_of("general_12"));
        }
    }

    #[test]
    fn page_size_defaults_and_clamps() {
        assert_eq!(parse_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("abc")), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("")), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("-")), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("px5")), DEFAULT_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("5")), 5);
        assert_eq!(parse_page_size(Some(" 20 ")), 20);
        assert_eq!(parse_page_size(Some("50")), 50);
        assert_eq!(parse_page_size(Some("51")), MAX_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("100000")), MAX_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("0")), 1);
        assert_eq!(parse_page_size(Some("-3")), 1);
        assert_eq!(parse_page_size(Some("+8")), 8);
    }

    #[test]
    fn page_size_overflowing_numbers_still_clamp() {
        assert_eq!(parse_page_size(Some("99999999999999999999")), MAX_PAGE_SIZE);
        assert_eq!(parse_page_size(Some("-99999999999999999999")), 1);
        assert_eq!(parse_page_size(Some("18446744073709551616")), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_size_reads_leading_integer() {
        // Same as parseInt: trailing garbage after the digits is ignored.
        assert_eq!(parse_page_size(Some("7.5")), 7);
        assert_eq!(parse_page_size(Some("5px")), 5);
        assert_eq!(parse_page_size(Some("80.9")), MAX_PAGE_SIZE);
    }

    #[test]
    fn lang_and_country_default_and_normalize() {
        let query = NewsQuery::from_params(&NewsParams {
            q: Some("sports".into()),
            country: Some(" US ".into()),
            lang: Some("EN".into()),
            ..Default::default()
        });
        assert_eq!(query.lang, "en");
        assert!(matches!(query.request, NewsRequest::Headlines { ref country, .. } if country == "us"));

        let query = NewsQuery::from_params(&NewsParams {
            lang: Some("  ".into()),
            ..Default::default()
        });
        assert_eq!(query.lang, DEFAULT_LANG);
    }

    #[test]
    fn params_from_query_map() {
        let map: HashMap<String, String> = [
            ("q", "salud"),
            ("pageSize", "5"),
            ("country", "mx"),
            ("unknown", "ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let params = NewsParams::from_map(&map);
        assert_eq!(params.q.as_deref(), Some("salud"));
        assert_eq!(params.page_size.as_deref(), Some("5"));
        assert_eq!(params.country.as_deref(), Some("mx"));
        assert_eq!(params.lang, None);
    }

    #[test]
    fn salud_scenario_key() {
        let query = NewsQuery::from_params(&params(Some("salud"), None));
        assert_eq!(query.cache_key(), key_of("health_12"));
        assert_eq!(
            query.cache_key(),
            NewsQuery::from_params(&params(Some("health"), None)).cache_key()
        );
    }

    #[test]
    fn bitcoin_scenario_key() {
        let query = NewsQuery::from_params(&params(Some("bitcoin"), Some("5")));
        assert_eq!(query.cache_key(), key_of("bitcoin_5"));
        assert_ne!(
            query.cache_key(),
            NewsQuery::from_params(&params(Some("salud"), None)).cache_key()
        );
    }

    #[test]
    fn page_size_changes_key() {
        let a = NewsQuery::from_params(&params(Some("science"), Some("10")));
        let b = NewsQuery::from_params(&params(Some("science"), Some("11")));
        assert_ne!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn cache_key_is_filename_safe() {
        let query = NewsQuery::from_params(&params(Some("../../etc/passwd ?&="), None));
        let key = query.cache_key();
        assert!(key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn upstream_params_for_headlines() {
        let query = NewsQuery::from_params(&params(Some("salud"), None));
        let params = query.upstream_params("secret");
        assert_eq!(
            params,
            vec![
                ("apikey", "secret".to_string()),
                ("lang", "es".to_string()),
                ("max", "12".to_string()),
                ("category", "health".to_string()),
                ("country", "ar".to_string()),
            ]
        );
        assert_eq!(query.request.endpoint(), "/top-headlines");
    }

    #[test]
    fn upstream_params_for_search() {
        let query = NewsQuery::from_params(&params(Some("Bitcoin"), Some("5")));
        let params = query.upstream_params("secret");
        assert!(params.contains(&("q", "Bitcoin".to_string())));
        assert!(params.contains(&("max", "5".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "category" || *k == "country"));
        assert_eq!(query.request.endpoint(), "/search");
    }
}
