use anyhow::{anyhow, Context, Result};
use scraper_chromiumoxide::{scrape_page, ChromiumRenderer};
use serde::{Deserialize, Serialize};
use shared::{CrawlRequest, ScrapeConfig};
use tokio::io::{stdin, AsyncReadExt};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize, PartialEq)]
struct Input {
    url: String,
    #[serde(default = "default_headless")] headless: bool,
}
fn default_headless() -> bool { true }

#[derive(Debug, Serialize)]
struct Output {
    status: &'static str,
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Parses the stdin payload; the URL comes back trimmed.
fn parse_input(buf: &str) -> Result<Input> {
    let mut inp: Input = serde_json::from_str(buf).context("expected {\"url\": \"...\"} on stdin")?;
    let url = CrawlRequest { url: Some(inp.url) }
        .target()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("url must not be blank"))?;
    inp.url = url;
    Ok(inp)
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the result, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut buf = String::new();
    stdin().read_to_string(&mut buf).await?;
    let inp = parse_input(&buf)?;

    // server variables (HOST, PORT, ...) are irrelevant here
    let mut config = ScrapeConfig::load()?;
    config.browser.headless = inp.headless;
    let renderer = ChromiumRenderer::new(config.browser);

    let out = match scrape_page(&renderer, &inp.url, config.max_text_length).await {
        Ok(content) => Output { status: "ok", url: inp.url, content: Some(content), error: None },
        Err(e) => Output { status: "error", url: inp.url, content: None, error: Some(e.to_string()) },
    };
    println!("{}", serde_json::to_string(&out)?);

    if out.error.is_some() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_trims_url_and_defaults_headless() {
        let inp = parse_input(r#"{"url": "  https://example.com\n"}"#).unwrap();
        assert_eq!(inp, Input { url: "https://example.com".to_string(), headless: true });

        let inp = parse_input(r#"{"url": "https://example.com", "headless": false}"#).unwrap();
        assert!(!inp.headless);
    }

    #[test]
    fn test_parse_input_rejects_blank_or_missing_url() {
        assert!(parse_input(r#"{"url": "   "}"#).is_err());
        assert!(parse_input(r#"{"url": ""}"#).is_err());
        assert!(parse_input("{}").is_err());
        assert!(parse_input("not json").is_err());
    }
}
