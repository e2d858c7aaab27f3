use async_trait::async_trait;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use shared::{BrowserOptions, ScrapeError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::PageRenderer;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Launches one headless Chromium per render and tears it down afterwards.
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    options: BrowserOptions,
}

impl ChromiumRenderer {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    fn browser_config(&self, profile_dir: &Path) -> Result<BrowserConfig, ScrapeError> {
        let (width, height) = self.options.window_size;
        // pages are emulated at the window size, not chromiumoxide's 800x600 default
        let mut builder = BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .viewport(Viewport {
                width,
                height,
                ..Viewport::default()
            })
            .args(self.options.args());
        if !self.options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(ScrapeError::Config)
    }

    async fn launch(&self, profile_dir: PathBuf) -> Result<BrowserSession, ScrapeError> {
        let config = self.browser_config(&profile_dir)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Launch(e.to_string()))?;

        // drive the CDP connection until the browser goes away
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "browser handler event error");
                }
            }
        });

        debug!(profile = %profile_dir.display(), "browser launched");
        Ok(BrowserSession {
            browser,
            handler,
            profile_dir,
        })
    }

    async fn render_once(self, url: String, profile_dir: PathBuf) -> Result<String, ScrapeError> {
        let session = match self.launch(profile_dir.clone()).await {
            Ok(session) => session,
            Err(e) => {
                remove_profile(&profile_dir).await;
                return Err(e);
            }
        };

        let result = session.load(&url, self.options.page_load_timeout).await;
        session.shutdown().await;
        result
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> Result<String, ScrapeError> {
        // Own task so the browser is still shut down if the caller is dropped.
        let renderer = self.clone();
        let url = url.to_string();
        let profile_dir = std::env::temp_dir().join(format!("crawl-profile-{}", Uuid::new_v4()));
        tokio::spawn(renderer.render_once(url, profile_dir))
            .await
            .map_err(|e| ScrapeError::Aborted(e.to_string()))?
    }
}

struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: PathBuf,
}

impl BrowserSession {
    /// Opens `url` and reads its HTML, all within `timeout`.
    async fn load(&self, url: &str, timeout: Duration) -> Result<String, ScrapeError> {
        let read = async {
            let page = self.open(url).await?;
            page.content()
                .await
                .map_err(|e| ScrapeError::Content(e.to_string()))
        };

        tokio::time::timeout(timeout, read)
            .await
            .map_err(|_| ScrapeError::Timeout {
                secs: timeout.as_secs(),
            })?
    }

    async fn open(&self, url: &str) -> Result<Page, ScrapeError> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| ScrapeError::Navigation(e.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|e| ScrapeError::Navigation(e.to_string()))?;

        wait_until_complete(&page).await;
        debug!(url, "document ready");
        Ok(page)
    }

    async fn shutdown(mut self) {
        match self.browser.close().await {
            Ok(_) => {
                if let Err(e) = self.browser.wait().await {
                    warn!(error = %e, "failed waiting for browser exit");
                }
            }
            Err(e) => {
                warn!(error = %e, "browser close failed, killing process");
                if let Some(Err(e)) = self.browser.kill().await {
                    warn!(error = %e, "failed to kill browser");
                }
            }
        }
        self.handler.abort();
        remove_profile(&self.profile_dir).await;
        debug!("browser shut down");
    }
}

/// Polls `document.readyState` until it reports `complete`.
///
/// Evaluation errors while the page is still swapping documents are treated
/// as "not ready yet"; the caller bounds the wait.
async fn wait_until_complete(page: &Page) {
    loop {
        match page.evaluate("document.readyState").await {
            Ok(result) => match result.into_value::<String>() {
                Ok(state) if state == "complete" => return,
                Ok(state) => debug!(state = %state, "document not ready"),
                Err(e) => debug!(error = %e, "unexpected readyState value"),
            },
            Err(e) => debug!(error = %e, "readyState evaluation failed"),
        }
        sleep(READY_POLL_INTERVAL).await;
    }
}

async fn remove_profile(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await {
        debug!(error = %e, profile = %dir.display(), "could not remove browser profile");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape_page;

    fn options_with_executable() -> BrowserOptions {
        BrowserOptions {
            // avoid depending on a locally installed browser for detection
            chrome_executable: Some(PathBuf::from("/usr/bin/chromium")),
            ..BrowserOptions::default()
        }
    }

    #[test]
    fn test_browser_config_builds() {
        let renderer = ChromiumRenderer::new(options_with_executable());
        let dir = std::env::temp_dir().join("crawl-profile-test");
        assert!(renderer.browser_config(&dir).is_ok());
    }

    #[test]
    fn test_viewport_matches_window_size() {
        let renderer = ChromiumRenderer::new(options_with_executable());
        let dir = std::env::temp_dir().join("crawl-profile-test");
        let config = format!("{:?}", renderer.browser_config(&dir).unwrap());
        assert!(
            config.contains("viewport: Some(Viewport { width: 1920, height: 1080"),
            "{}",
            config
        );

        let renderer = ChromiumRenderer::new(BrowserOptions {
            window_size: (1366, 768),
            ..options_with_executable()
        });
        let config = format!("{:?}", renderer.browser_config(&dir).unwrap());
        assert!(config.contains("viewport: Some(Viewport { width: 1366, height: 768"));
    }

    #[tokio::test]
    async fn test_missing_executable_fails_to_launch() {
        let renderer = ChromiumRenderer::new(BrowserOptions {
            chrome_executable: Some(PathBuf::from("/nonexistent/chrome-binary")),
            ..BrowserOptions::default()
        });

        let err = renderer.render("https://example.com").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Launch(_)), "got {:?}", err);
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome/Chromium"]
    async fn test_renders_javascript_content() {
        let renderer = ChromiumRenderer::new(BrowserOptions::default());
        let url = "data:text/html,<body><p>static</p>\
                   <script>document.body.insertAdjacentHTML('beforeend','<p>dynamic</p>')</script></body>";

        let text = scrape_page(&renderer, url, 8000).await.unwrap();
        assert_eq!(text, "static dynamic");
    }

    #[tokio::test]
    #[ignore = "requires a local Chrome/Chromium"]
    async fn test_unresponsive_page_times_out_and_cleans_up() {
        // accepts connections and never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let renderer = ChromiumRenderer::new(BrowserOptions {
            page_load_timeout: Duration::from_secs(1),
            ..BrowserOptions::default()
        });
        let profile_dir = std::env::temp_dir().join(format!("crawl-profile-{}", Uuid::new_v4()));

        let err = renderer
            .render_once(format!("http://{}/", addr), profile_dir.clone())
            .await
            .unwrap_err();

        assert!(matches!(err, ScrapeError::Timeout { secs: 1 }), "got {:?}", err);
        assert!(!profile_dir.exists(), "profile dir left behind");
    }
}
