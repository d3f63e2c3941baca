use anyhow::{Context, Result};
use std::{path::PathBuf, time::Duration};
use tracing::trace;

pub mod browser;
pub mod http;

/// Desktop browser user agent, the upstream site serves a different page to unknown agents
static USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
static ACCEPT_LANGUAGE: &str = "ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7";

#[derive(Clone, Debug, Default)]
pub struct Opts {
    /// Applies to browser startup and to page navigation, separately
    pub timeout: Duration,
    /// Chrome/Chromium binary, auto detected if not set
    pub chrome_path: Option<PathBuf>,
    /// Zero disables the HTTP cache
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
}

/// Where menu pages come from
#[derive(Clone)]
pub enum Fetcher {
    /// Render the page in a fresh headless browser for each request
    Browser(browser::Launcher),
    /// Plain HTTP GET, no javascript
    Http(http::Client),
    /// Read a saved copy of the page from disk
    File(PathBuf),
    #[cfg(test)]
    Inline(std::sync::Arc<str>),
    /// Never answers
    #[cfg(test)]
    Stalled,
}

impl Fetcher {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Browser(_) => "browser",
            Self::Http(_) => "http",
            Self::File(_) => "file",
            #[cfg(test)]
            Self::Inline(_) => "inline",
            #[cfg(test)]
            Self::Stalled => "stalled",
        }
    }

    /// Get the raw HTML for `url`
    pub async fn fetch(&self, url: &str) -> Result<String> {
        trace!(url, fetcher = self.name(), "Fetching page...");
        match self {
            Self::Browser(b) => b.get_page(url).await,
            Self::Http(c) => c.get_as_string(url).await,
            Self::File(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display())),
            #[cfg(test)]
            Self::Inline(html) => Ok(html.to_string()),
            #[cfg(test)]
            Self::Stalled => std::future::pending().await,
        }
    }
}
