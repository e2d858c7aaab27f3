// Text limits
pub const DEFAULT_MAX_TEXT_LENGTH: usize = 8000;
pub const TRUNCATION_MARKER: &str = "...";

// Browser defaults
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_WINDOW_SIZE: (u32, u32) = (1920, 1080);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Flags passed to every launched browser, on top of the window size and user agent.
pub const CHROME_FLAGS: &[&str] = &[
    "--disable-gpu",
    "--no-sandbox",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-infobars",
];

// Server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STATIC_DIR: &str = "static";

// Response messages
pub const MISSING_URL_MESSAGE: &str = "Missing URL to crawl";
