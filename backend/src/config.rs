use std::{env, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use url::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_WORDPRESS_URL: &str = "https://gurastech.com";
const DEFAULT_WORDPRESS_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_FEATURED_CATEGORY_KEYWORDS: &[&str] = &["wellness", "exam"];
const DEFAULT_FEATURED_POST_SLUG: &str = "pet-wellness-exams";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub bind_addr: String,
    pub wordpress: WordPressConfig,
    pub featured: FeaturedConfig,
    /// Directory for daily-rolling log files; stdout only when unset.
    pub log_dir: Option<PathBuf>,
}

/// Connection settings for the upstream WordPress site.
#[derive(Clone, Debug)]
pub struct WordPressConfig {
    /// Site root without trailing slash, e.g. `https://example.com`.
    pub base_url: String,
    /// Deadline applied to every outbound request.
    pub timeout: Duration,
}

/// Which category and post the home listing surfaces first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeaturedConfig {
    /// Lower-cased keywords that must all appear in the category name.
    pub category_keywords: Vec<String>,
    /// Slug of the post pinned to the top of that category.
    pub post_slug: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match read("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("invalid PORT: {raw}"))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = read("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let base_url = read("WORDPRESS_URL").unwrap_or_else(|| DEFAULT_WORDPRESS_URL.to_string());
        let timeout_seconds = read("WORDPRESS_TIMEOUT_SECONDS")
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(DEFAULT_WORDPRESS_TIMEOUT_SECONDS)
            .max(1);
        let wordpress = WordPressConfig::new(&base_url, Duration::from_secs(timeout_seconds))?;

        let category_keywords = read("FEATURED_CATEGORY_KEYWORDS")
            .map(|value| parse_keywords(&value))
            .filter(|keywords| !keywords.is_empty())
            .unwrap_or_else(|| {
                DEFAULT_FEATURED_CATEGORY_KEYWORDS
                    .iter()
                    .map(|keyword| keyword.to_string())
                    .collect()
            });
        // Set-but-empty disables slug pinning; unset keeps the default.
        let post_slug = match lookup("FEATURED_POST_SLUG") {
            None => Some(DEFAULT_FEATURED_POST_SLUG.to_string()),
            Some(value) => Some(value.trim().to_string()).filter(|slug| !slug.is_empty()),
        };

        Ok(Self {
            port,
            bind_addr,
            wordpress,
            featured: FeaturedConfig {
                category_keywords,
                post_slug,
            },
            log_dir: read("LOG_DIR").map(PathBuf::from),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

impl WordPressConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout,
        })
    }

    /// REST root, `{base_url}/wp-json/wp/v2`.
    pub fn api_url(&self) -> String {
        format!("{}/wp-json/wp/v2", self.base_url)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).with_context(|| format!("invalid WORDPRESS_URL: {raw}"))?;
    match parsed.scheme() {
        "http" | "https" => {},
        other => anyhow::bail!("`WORDPRESS_URL` must use http or https, got `{other}`"),
    }
    if parsed.host_str().is_none() {
        anyhow::bail!("`WORDPRESS_URL` must include a host");
    }
    Ok(trimmed.to_string())
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
