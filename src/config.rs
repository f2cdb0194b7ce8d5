use std::time::Duration;

use anyhow::Context as _;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://openlibrary.org/search.json";
pub const DEFAULT_COVERS_URL: &str = "https://covers.openlibrary.org";
pub const DEFAULT_SITE_URL: &str = "https://openlibrary.org";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub covers_url: Url,
    pub site_url: Url,
    pub debounce: Duration,
    pub user_agent: String,
}

impl ClientConfig {
    /// The public Open Library endpoints with the default debounce window.
    pub fn defaults() -> anyhow::Result<Self> {
        Ok(Self {
            api_url: parse_http_url(DEFAULT_API_URL).context("parse default api url")?,
            covers_url: parse_http_url(DEFAULT_COVERS_URL).context("parse default covers url")?,
            site_url: parse_http_url(DEFAULT_SITE_URL).context("parse default site url")?,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            user_agent: default_user_agent(),
        })
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves the config from `lookup`, falling back to defaults for unset or
    /// blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::defaults()?;
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = var("BOOKSEARCH_API_URL") {
            config.api_url =
                parse_http_url(&raw).context("invalid BOOKSEARCH_API_URL")?;
        }
        if let Some(raw) = var("BOOKSEARCH_COVERS_URL") {
            config.covers_url =
                parse_http_url(&raw).context("invalid BOOKSEARCH_COVERS_URL")?;
        }
        if let Some(raw) = var("BOOKSEARCH_SITE_URL") {
            config.site_url = parse_http_url(&raw).context("invalid BOOKSEARCH_SITE_URL")?;
        }
        if let Some(raw) = var("BOOKSEARCH_DEBOUNCE_MS") {
            let ms = raw
                .parse::<u64>()
                .with_context(|| format!("invalid BOOKSEARCH_DEBOUNCE_MS={raw:?}"))?;
            config.debounce = Duration::from_millis(ms);
        }

        Ok(config)
    }

    pub fn with_api_url(mut self, raw: Option<&str>) -> anyhow::Result<Self> {
        if let Some(raw) = raw {
            self.api_url = parse_http_url(raw).context("parse --api-url")?;
        }
        Ok(self)
    }
}

pub fn parse_http_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("parse url: {raw}"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("url must be http/https: {url}");
    }
    Ok(url)
}

fn default_user_agent() -> String {
    format!("booksearch/{}", env!("CARGO_PKG_VERSION"))
}
