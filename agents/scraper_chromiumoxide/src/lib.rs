//! Scrape-once: render a page in a fresh headless browser and reduce it to
//! bounded visible text.

pub mod browser;
pub mod extract;

use async_trait::async_trait;
use shared::ScrapeError;
use tracing::debug;

pub use browser::ChromiumRenderer;
pub use extract::{extract_visible_text, truncate_text};

/// Something that can turn a URL into rendered HTML.
#[async_trait]
pub trait PageRenderer: Send + Sync + 'static {
    async fn render(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Renders `url`, extracts its visible text and truncates it to `max_chars`.
pub async fn scrape_page<R>(renderer: &R, url: &str, max_chars: usize) -> Result<String, ScrapeError>
where
    R: PageRenderer + ?Sized,
{
    let html = renderer.render(url).await?;
    debug!(url, html_len = html.len(), "page rendered");

    let text = extract_visible_text(&html);
    Ok(truncate_text(&text, max_chars))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticRenderer(&'static str);

    #[async_trait]
    impl PageRenderer for StaticRenderer {
        async fn render(&self, _url: &str) -> Result<String, ScrapeError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl PageRenderer for FailingRenderer {
        async fn render(&self, _url: &str) -> Result<String, ScrapeError> {
            Err(ScrapeError::Timeout { secs: 20 })
        }
    }

    #[tokio::test]
    async fn test_scrape_page_strips_and_truncates() {
        let renderer = StaticRenderer(
            "<html><head><style>p{}</style></head>\
             <body><script>var x = 1;</script><p>Hello   world</p><p>again</p></body></html>",
        );

        let text = scrape_page(&renderer, "https://example.com", 100).await.unwrap();
        assert_eq!(text, "Hello world again");

        let text = scrape_page(&renderer, "https://example.com", 5).await.unwrap();
        assert_eq!(text, "Hello...");
    }

    #[tokio::test]
    async fn test_scrape_page_propagates_errors() {
        let err = scrape_page(&FailingRenderer, "https://example.com", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, ScrapeError::Timeout { secs: 20 }));
    }

    #[tokio::test]
    async fn test_scrape_page_through_trait_object() {
        let renderer: Box<dyn PageRenderer> = Box::new(StaticRenderer("<body>ok</body>"));
        let text = scrape_page(renderer.as_ref(), "https://example.com", 10).await.unwrap();
        assert_eq!(text, "ok");
    }
}
