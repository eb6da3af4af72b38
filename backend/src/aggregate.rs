//! Category-grouped listings assembled from several concurrent post queries.
//!
//! One failing category never fails the listing: its fetch error is logged
//! and the category contributes no posts. Only the initial category fetch is
//! fatal.

use futures_util::future::join_all;
use pawpress_shared::{
    CategorySummary, CategoryWithPosts, NormalizedPost, WpCategory, UNCATEGORIZED_CATEGORY_ID,
};

use crate::{
    boost::{apply_boost, boosted_category_index, locate_post, BoostPolicy},
    wordpress::{transform_post, ContentError, ContentSource, PostQuery, MAX_PER_PAGE},
};

/// How many recent posts to scan when the boosted post is not in any bucket.
const BOOSTED_POST_SCAN: u32 = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregationOptions {
    pub max_categories: usize,
    pub posts_per_category: u32,
    /// Page size for the uncategorized bucket; `None` leaves it out.
    pub uncategorized_posts: Option<u32>,
}

impl Default for AggregationOptions {
    fn default() -> Self {
        Self {
            max_categories: 4,
            posts_per_category: 3,
            uncategorized_posts: None,
        }
    }
}

impl AggregationOptions {
    /// Layout of the home page: three posts per topic plus up to six
    /// uncategorized ones.
    pub fn home() -> Self {
        Self {
            uncategorized_posts: Some(6),
            ..Self::default()
        }
    }
}

pub async fn categories_with_posts<S>(
    source: &S,
    options: &AggregationOptions,
) -> Result<Vec<CategoryWithPosts>, ContentError>
where
    S: ContentSource + ?Sized,
{
    let categories = source.get_categories().await?;

    let selected: Vec<&WpCategory> = categories
        .iter()
        .filter(|category| category.id != UNCATEGORIZED_CATEGORY_ID)
        .take(options.max_categories)
        .collect();

    let per_category = join_all(selected.into_iter().map(|category| async move {
        let query = PostQuery::latest_in_category(category.id, options.posts_per_category);
        let posts = fetch_normalized(source, &query)
            .await
            .unwrap_or_else(|err| {
                tracing::warn!(
                    category_id = category.id,
                    "error fetching posts for category {}: {err}",
                    category.name
                );
                Vec::new()
            });
        CategoryWithPosts {
            category: category.clone(),
            posts,
        }
    }));
    let uncategorized = uncategorized_bucket(source, &categories, options.uncategorized_posts);

    let (mut buckets, uncategorized) = tokio::join!(per_category, uncategorized);
    buckets.extend(uncategorized);
    buckets.retain(|bucket| !bucket.posts.is_empty());

    tracing::debug!(buckets = buckets.len(), "aggregated categories with posts");
    Ok(buckets)
}

/// [`categories_with_posts`] followed by the editorial boost. When the
/// boosted post is not in any bucket, the latest posts are scanned for it.
pub async fn prioritized_categories<S>(
    source: &S,
    options: &AggregationOptions,
    policy: &dyn BoostPolicy,
) -> Result<Vec<CategoryWithPosts>, ContentError>
where
    S: ContentSource + ?Sized,
{
    let buckets = categories_with_posts(source, options).await?;

    let mut fallback = None;
    if boosted_category_index(&buckets, policy).is_some() {
        if let Some(slug) = policy.boosted_slug() {
            if locate_post(&buckets, slug).is_none() {
                fallback = find_recent_post(source, slug).await;
            }
        }
    }

    Ok(apply_boost(buckets, policy, fallback))
}

/// Every category with the number of posts it holds (up to one page of
/// 100), skipping empty ones, sorted by name.
pub async fn category_post_counts<S>(source: &S) -> Result<Vec<CategorySummary>, ContentError>
where
    S: ContentSource + ?Sized,
{
    let categories = source.get_categories().await?;

    let mut summaries = join_all(categories.iter().map(|category| async move {
        let query = PostQuery::latest_in_category(category.id, MAX_PER_PAGE);
        let count = match source.get_posts(&query).await {
            Ok(posts) => posts.len(),
            Err(err) => {
                tracing::warn!(category_id = category.id, "error counting posts: {err}");
                0
            },
        };
        CategorySummary::new(category, count)
    }))
    .await;

    summaries.retain(|summary| summary.count > 0);
    summaries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(summaries)
}

async fn fetch_normalized<S>(
    source: &S,
    query: &PostQuery,
) -> Result<Vec<NormalizedPost>, ContentError>
where
    S: ContentSource + ?Sized,
{
    let posts = source.get_posts(query).await?;
    Ok(posts.iter().map(transform_post).collect())
}

async fn uncategorized_bucket<S>(
    source: &S,
    categories: &[WpCategory],
    per_page: Option<u32>,
) -> Option<CategoryWithPosts>
where
    S: ContentSource + ?Sized,
{
    let per_page = per_page?;
    let category = categories
        .iter()
        .find(|category| category.id == UNCATEGORIZED_CATEGORY_ID)?;

    let query = PostQuery::latest_in_category(UNCATEGORIZED_CATEGORY_ID, per_page);
    match fetch_normalized(source, &query).await {
        Ok(posts) if !posts.is_empty() => Some(CategoryWithPosts {
            category: category.clone(),
            posts,
        }),
        Ok(_) => None,
        Err(err) => {
            tracing::warn!("error fetching uncategorized posts: {err}");
            None
        },
    }
}

async fn find_recent_post<S>(source: &S, slug: &str) -> Option<NormalizedPost>
where
    S: ContentSource + ?Sized,
{
    match source.get_posts(&PostQuery::latest(BOOSTED_POST_SCAN)).await {
        Ok(posts) => posts
            .iter()
            .find(|post| post.slug == slug)
            .map(transform_post),
        Err(err) => {
            tracing::warn!("error fetching boosted post `{slug}`: {err}");
            None
        },
    }
}
