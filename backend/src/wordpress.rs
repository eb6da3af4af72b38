//! HTTP client for the WordPress REST API.

use std::{fmt, future::Future, str::FromStr, time::Duration};

use anyhow::Context;
use async_trait::async_trait;
use pawpress_shared::{WpCategory, WpPost, WpTag};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::config::WordPressConfig;

pub use pawpress_shared::transform_post;

const DEFAULT_PER_PAGE: u32 = 10;
const DEFAULT_PAGE: u32 = 1;
/// WordPress caps `per_page` at 100.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("WordPress API error: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("WordPress request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("WordPress returned an unexpected body: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("WordPress request to `{endpoint}` timed out after {}s", .after.as_secs())]
    Timeout { endpoint: String, after: Duration },
    #[error("WordPress request cancelled")]
    Cancelled,
}

/// `orderby` values accepted by `GET /posts`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PostOrderBy {
    #[default]
    Date,
    Relevance,
    Id,
    Include,
    Title,
    Slug,
}

impl PostOrderBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Relevance => "relevance",
            Self::Id => "id",
            Self::Include => "include",
            Self::Title => "title",
            Self::Slug => "slug",
        }
    }
}

impl FromStr for PostOrderBy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "relevance" => Ok(Self::Relevance),
            "id" => Ok(Self::Id),
            "include" => Ok(Self::Include),
            "title" => Ok(Self::Title),
            "slug" => Ok(Self::Slug),
            other => Err(format!("unsupported orderby `{other}`")),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unsupported order `{other}`")),
        }
    }
}

/// Filters for `GET /posts`. Unset fields use the WordPress-side defaults the
/// site has always relied on (10 per page, page 1, newest first).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
    pub categories: Vec<u64>,
    pub tags: Vec<u64>,
    pub search: Option<String>,
    pub orderby: Option<PostOrderBy>,
    pub order: Option<SortOrder>,
}

impl PostQuery {
    /// Newest `per_page` posts of one category.
    pub fn latest_in_category(category_id: u64, per_page: u32) -> Self {
        Self {
            per_page: Some(per_page),
            categories: vec![category_id],
            orderby: Some(PostOrderBy::Date),
            order: Some(SortOrder::Desc),
            ..Self::default()
        }
    }

    pub fn latest(per_page: u32) -> Self {
        Self {
            per_page: Some(per_page),
            ..Self::default()
        }
    }

    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("per_page", self.per_page.unwrap_or(DEFAULT_PER_PAGE).to_string()),
            ("page", self.page.unwrap_or(DEFAULT_PAGE).to_string()),
            ("orderby", self.orderby.unwrap_or_default().as_str().to_string()),
            ("order", self.order.unwrap_or_default().as_str().to_string()),
            ("_embed", "true".to_string()),
        ];
        if !self.categories.is_empty() {
            pairs.push(("categories", join_ids(&self.categories)));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", join_ids(&self.tags)));
        }
        if let Some(search) = self.search.as_deref().filter(|value| !value.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Read access to CMS content. Aggregation and handlers depend on this
/// rather than on [`WordPressClient`] so they can run against fakes.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn get_posts(&self, query: &PostQuery) -> Result<Vec<WpPost>, ContentError>;

    /// `Ok(None)` when no post has exactly this slug.
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<WpPost>, ContentError>;

    async fn get_categories(&self) -> Result<Vec<WpCategory>, ContentError>;

    async fn get_tags(&self) -> Result<Vec<WpTag>, ContentError>;
}

#[derive(Clone)]
pub struct WordPressClient {
    api_url: String,
    deadline: Duration,
    client: reqwest::Client,
    shutdown: CancellationToken,
}

impl fmt::Debug for WordPressClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WordPressClient")
            .field("api_url", &self.api_url)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl WordPressClient {
    pub fn new(config: &WordPressConfig, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(concat!("pawpress/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build wordpress http client")?;

        Ok(Self {
            api_url: config.api_url(),
            deadline: config.timeout,
            client,
            shutdown,
        })
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T, ContentError> {
        let url = format!("{}/{}", self.api_url, endpoint);
        let request = async {
            let response = self
                .client
                .get(&url)
                .query(query)
                .send()
                .await
                .map_err(|err| self.transport_error(endpoint, err))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ContentError::Status {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }

            response.json::<T>().await.map_err(ContentError::Decode)
        };

        let outcome = self.guarded(endpoint, request).await;
        if let Err(err) = &outcome {
            tracing::warn!(endpoint, "error fetching WordPress {endpoint}: {err}");
        }
        outcome
    }

    /// Race `request` against the per-call deadline and process shutdown.
    async fn guarded<T>(
        &self,
        endpoint: &str,
        request: impl Future<Output = Result<T, ContentError>>,
    ) -> Result<T, ContentError> {
        tokio::select! {
            _ = self.shutdown.cancelled() => Err(ContentError::Cancelled),
            outcome = tokio::time::timeout(self.deadline, request) => {
                outcome.unwrap_or_else(|_| Err(self.timeout_error(endpoint)))
            },
        }
    }

    fn transport_error(&self, endpoint: &str, err: reqwest::Error) -> ContentError {
        if err.is_timeout() {
            self.timeout_error(endpoint)
        } else {
            ContentError::Transport(err)
        }
    }

    fn timeout_error(&self, endpoint: &str) -> ContentError {
        ContentError::Timeout {
            endpoint: endpoint.to_string(),
            after: self.deadline,
        }
    }
}

#[async_trait]
impl ContentSource for WordPressClient {
    async fn get_posts(&self, query: &PostQuery) -> Result<Vec<WpPost>, ContentError> {
        self.fetch_json("posts", &query.to_query_pairs()).await
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<WpPost>, ContentError> {
        let posts: Vec<WpPost> = self
            .fetch_json("posts", &[("slug", slug.to_string()), ("_embed", "true".to_string())])
            .await?;
        Ok(posts.into_iter().next())
    }

    async fn get_categories(&self) -> Result<Vec<WpCategory>, ContentError> {
        self.fetch_json("categories", &[("per_page", MAX_PER_PAGE.to_string())])
            .await
    }

    async fn get_tags(&self) -> Result<Vec<WpTag>, ContentError> {
        self.fetch_json("tags", &[("per_page", MAX_PER_PAGE.to_string())])
            .await
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
