use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::*;

/// Fixed launch configuration for the headless browser
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,
    pub window_size: (u32, u32),
    pub user_agent: String,
    /// Explicit Chrome/Chromium binary; auto-detected when unset
    pub chrome_executable: Option<PathBuf>,
    /// Upper bound on waiting for `document.readyState == "complete"`
    pub page_load_timeout: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window_size: DEFAULT_WINDOW_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_executable: None,
            page_load_timeout: Duration::from_secs(DEFAULT_PAGE_LOAD_TIMEOUT_SECS),
        }
    }
}

impl BrowserOptions {
    /// Command line flags for the browser process.
    pub fn args(&self) -> Vec<String> {
        let mut args: Vec<String> = CHROME_FLAGS.iter().map(|s| s.to_string()).collect();
        args.push(format!(
            "--window-size={},{}",
            self.window_size.0, self.window_size.1
        ));
        args.push(format!("--user-agent={}", self.user_agent));
        args
    }
}

/// Settings that affect a single scrape, shared by the API and the one-shot CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Extracted text longer than this many characters is truncated
    pub max_text_length: usize,
    pub browser: BrowserOptions,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
            browser: BrowserOptions::default(),
        }
    }
}

impl ScrapeConfig {
    /// Loads the scrape settings from the process environment, ignoring server variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| non_blank(&lookup, key);

        if let Some(max) = get("MAX_TEXT_LENGTH") {
            config.max_text_length = max
                .parse()
                .with_context(|| format!("Invalid MAX_TEXT_LENGTH: {}", max))?;
            if config.max_text_length == 0 {
                bail!("MAX_TEXT_LENGTH must be greater than zero");
            }
        }
        if let Some(secs) = get("PAGE_LOAD_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("Invalid PAGE_LOAD_TIMEOUT_SECS: {}", secs))?;
            if secs == 0 {
                bail!("PAGE_LOAD_TIMEOUT_SECS must be greater than zero");
            }
            config.browser.page_load_timeout = Duration::from_secs(secs);
        }
        if let Some(path) = get("CHROME_EXECUTABLE") {
            config.browser.chrome_executable = Some(PathBuf::from(path));
        }
        if let Some(headless) = get("HEADLESS") {
            config.browser.headless = parse_flag(&headless)
                .with_context(|| format!("Invalid HEADLESS: {}", headless))?;
        }

        Ok(config)
    }
}

/// Process configuration, read once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory holding the frontend (`index.html` and friends)
    pub static_dir: PathBuf,
    /// Extracted text longer than this many characters is truncated
    pub max_text_length: usize,
    pub browser: BrowserOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        let scrape = ScrapeConfig::default();
        Self {
            host: DEFAULT_HOST.parse().unwrap_or(IpAddr::from([0, 0, 0, 0])),
            port: DEFAULT_PORT,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            max_text_length: scrape.max_text_length,
            browser: scrape.browser,
        }
    }
}

impl AppConfig {
    /// Loads the configuration from the process environment.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scrape = ScrapeConfig::from_lookup(&lookup)?;
        let mut config = Self {
            max_text_length: scrape.max_text_length,
            browser: scrape.browser,
            ..Self::default()
        };
        let get = |key: &str| non_blank(&lookup, key);

        if let Some(host) = get("HOST") {
            config.host = host
                .parse()
                .with_context(|| format!("Invalid HOST: {}", host))?;
        }
        if let Some(port) = get("PORT") {
            config.port = port
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?;
        }
        if let Some(dir) = get("STATIC_DIR") {
            config.static_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got {:?}", other),
    }
}
