pub mod config;
pub mod constants;
pub mod types;

pub use config::{AppConfig, BrowserOptions, ScrapeConfig};
pub use types::{CrawlRequest, CrawlResponse, ErrorResponse};

// Error handling
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Page did not finish loading within {secs}s")]
    Timeout { secs: u64 },

    #[error("Failed to read page content: {0}")]
    Content(String),

    #[error("Invalid browser configuration: {0}")]
    Config(String),

    #[error("Render task aborted: {0}")]
    Aborted(String),
}
