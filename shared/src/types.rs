use serde::{Deserialize, Serialize};

/// Body of `POST /api/crawl_url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl CrawlRequest {
    /// The requested URL, trimmed. `None` when missing or blank.
    pub fn target(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlResponse {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }

    /// Message returned when scraping `url` failed.
    pub fn crawl_failed(url: &str, cause: impl std::fmt::Display) -> Self {
        Self::new(format!("Could not crawl content from {}. Error: {}", url, cause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_ignores_blank_urls() {
        let req: CrawlRequest = serde_json::from_str(r#"{"url": "   "}"#).unwrap();
        assert_eq!(req.target(), None);

        let req: CrawlRequest = serde_json::from_str(r#"{"url": null}"#).unwrap();
        assert_eq!(req.target(), None);

        let req: CrawlRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.target(), None);
    }

    #[test]
    fn test_target_trims_whitespace() {
        let req: CrawlRequest =
            serde_json::from_str(r#"{"url": " https://example.com\n"}"#).unwrap();
        assert_eq!(req.target(), Some("https://example.com"));
    }

    #[test]
    fn test_crawl_failed_message() {
        let body = ErrorResponse::crawl_failed("https://example.com", "boom");
        assert_eq!(
            body.error,
            "Could not crawl content from https://example.com. Error: boom"
        );
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "error": "Could not crawl content from https://example.com. Error: boom" })
        );
    }
}
