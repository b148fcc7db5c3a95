use reqwest::blocking::{Client, Request};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::RawArticle;
use crate::errors::{TrendError, TrendResult};
use crate::sources::traits::{ArticleQuery, ArticleSource, FetchOutcome};

const API_KEY_HEADER: &str = "X-Api-Key";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiResponse {
    status: String,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<RawArticle>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for the NewsAPI `everything` endpoint.
pub struct NewsApiSource {
    client: Client,
    endpoint: String,
    api_key: String,
    language: Option<String>,
}

impl NewsApiSource {
    pub fn new(config: &Config) -> TrendResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("trendfeed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        })
    }

    /// Query string for a request. The key travels in a header so it never
    /// appears in URLs or error messages.
    fn build_params(&self, query: &ArticleQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.query.clone()),
            ("from", query.window.from.format(DATE_FORMAT).to_string()),
            ("to", query.window.to.format(DATE_FORMAT).to_string()),
            ("sortBy", query.sort_order.as_str().to_string()),
            ("pageSize", query.page_size.to_string()),
        ];
        if let Some(ref language) = self.language {
            params.push(("language", language.clone()));
        }
        params
    }

    fn build_request(&self, query: &ArticleQuery) -> TrendResult<Request> {
        let request = self
            .client
            .get(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&self.build_params(query))
            .build()?;
        Ok(request)
    }

    fn request(&self, query: &ArticleQuery) -> TrendResult<Vec<RawArticle>> {
        let response = self.client.execute(self.build_request(query)?)?;

        let status = response.status();
        let body = response.text()?;
        parse_response(status, &body)
    }
}

impl ArticleSource for NewsApiSource {
    fn fetch(&self, query: &ArticleQuery) -> FetchOutcome {
        debug!(window = %query.window, page_size = query.page_size, sort_by = %query.sort_order, "Requesting articles");

        match self.request(query) {
            Ok(articles) => {
                info!(window = %query.window, count = articles.len(), "Fetched articles");
                FetchOutcome::Fetched(articles)
            }
            Err(e) => {
                warn!(window = %query.window, error = %e, "Article fetch failed");
                FetchOutcome::Failed(e)
            }
        }
    }
}

/// Interpret a NewsAPI response body. Error bodies carry a `code` and
/// `message` even on non-2xx statuses.
fn parse_response(status: StatusCode, body: &str) -> TrendResult<Vec<RawArticle>> {
    match serde_json::from_str::<NewsApiResponse>(body) {
        Ok(response) if status.is_success() && response.status == "ok" => {
            debug!(total_results = ?response.total_results, "News API reported results");
            Ok(response.articles)
        }
        Ok(response) => Err(TrendError::Api {
            code: response.code.unwrap_or_else(|| status.as_u16().to_string()),
            message: response
                .message
                .unwrap_or_else(|| format!("unexpected status {:?}", response.status)),
        }),
        Err(_) if !status.is_success() => Err(TrendError::Api {
            code: status.as_u16().to_string(),
            message: status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DateWindow;
    use crate::sources::SortOrder;
    use chrono::NaiveDate;

    fn source(language: Option<&str>) -> NewsApiSource {
        let config = Config::new("test-key")
            .unwrap()
            .with_language(language);
        NewsApiSource::new(&config).unwrap()
    }

    fn query() -> ArticleQuery {
        let day = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        ArticleQuery {
            query: "AI OR 人工智能".to_string(),
            window: DateWindow::new(day - chrono::Duration::days(6), day),
            page_size: 100,
            sort_order: SortOrder::Popularity,
        }
    }

    #[test]
    fn test_build_params() {
        let params = source(Some("zh")).build_params(&query());

        assert!(params.contains(&("q", "AI OR 人工智能".to_string())));
        assert!(params.contains(&("from", "2024-02-09".to_string())));
        assert!(params.contains(&("to", "2024-02-15".to_string())));
        assert!(params.contains(&("sortBy", "popularity".to_string())));
        assert!(params.contains(&("pageSize", "100".to_string())));
        assert!(params.contains(&("language", "zh".to_string())));
        assert!(!params.iter().any(|(_, v)| v == "test-key"));
    }

    #[test]
    fn test_api_key_sent_as_header_only() {
        let request = source(Some("zh")).build_request(&query()).unwrap();

        assert_eq!(request.headers()[API_KEY_HEADER], "test-key");
        assert!(!request.url().as_str().contains("test-key"));
        assert!(!request.url().query_pairs().any(|(k, _)| k == "apiKey"));
    }

    #[test]
    fn test_build_params_without_language() {
        let params = source(None).build_params(&query());
        assert!(!params.iter().any(|(k, _)| *k == "language"));
    }

    #[test]
    fn test_parse_ok_response() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "Wire"}, "title": "One", "url": "https://a.com"},
                {"source": {"name": null}, "title": "[Removed]", "url": "https://removed.com"}
            ]
        }"#;

        let articles = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title.as_deref(), Some("One"));
    }

    #[test]
    fn test_parse_ok_response_without_articles() {
        let body = r#"{"status": "ok", "totalResults": 0, "articles": []}"#;
        assert!(parse_response(StatusCode::OK, body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_error_body() {
        let body = r#"{"status": "error", "code": "apiKeyInvalid", "message": "Your API key is invalid."}"#;

        match parse_response(StatusCode::UNAUTHORIZED, body) {
            Err(TrendError::Api { code, message }) => {
                assert_eq!(code, "apiKeyInvalid");
                assert_eq!(message, "Your API key is invalid.");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_non_json_error_status() {
        match parse_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>") {
            Err(TrendError::Api { code, .. }) => assert_eq!(code, "502"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_invalid_json_success_status() {
        assert!(matches!(
            parse_response(StatusCode::OK, "not json"),
            Err(TrendError::Json(_))
        ));
    }

    #[test]
    fn test_fetch_unreachable_endpoint_is_failed_outcome() {
        let config = Config::new("test-key")
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/v2/everything")
            .with_request_timeout(std::time::Duration::from_secs(2));
        let source = NewsApiSource::new(&config).unwrap();

        assert!(source.fetch(&query()).is_failed());
    }
}
