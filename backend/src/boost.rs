//! Editorial boost: pin one category, and one post inside it, to the top of
//! the home listing.

use pawpress_shared::{CategoryWithPosts, NormalizedPost, WpCategory};

use crate::config::FeaturedConfig;

pub trait BoostPolicy: Send + Sync {
    fn is_boosted_category(&self, category: &WpCategory) -> bool;

    /// Slug of the post to pin first inside the boosted category.
    fn boosted_slug(&self) -> Option<&str>;
}

/// Boosts the first category whose name contains every keyword
/// (case-insensitive).
#[derive(Clone, Debug)]
pub struct KeywordBoost {
    keywords: Vec<String>,
    slug: Option<String>,
}

impl KeywordBoost {
    pub fn new<I, S>(keywords: I, slug: Option<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|keyword| keyword.as_ref().trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
            slug,
        }
    }

    pub fn from_config(config: &FeaturedConfig) -> Self {
        Self::new(&config.category_keywords, config.post_slug.clone())
    }
}

impl BoostPolicy for KeywordBoost {
    fn is_boosted_category(&self, category: &WpCategory) -> bool {
        if self.keywords.is_empty() {
            return false;
        }
        let name = category.name.to_lowercase();
        self.keywords.iter().all(|keyword| name.contains(keyword.as_str()))
    }

    fn boosted_slug(&self) -> Option<&str> {
        self.slug.as_deref()
    }
}

/// Index of the boosted category, if any bucket matches.
pub fn boosted_category_index(
    buckets: &[CategoryWithPosts],
    policy: &dyn BoostPolicy,
) -> Option<usize> {
    buckets
        .iter()
        .position(|bucket| policy.is_boosted_category(&bucket.category))
}

/// `(bucket, post)` position of the first post with `slug`.
pub fn locate_post(buckets: &[CategoryWithPosts], slug: &str) -> Option<(usize, usize)> {
    buckets.iter().enumerate().find_map(|(bucket_index, bucket)| {
        bucket
            .posts
            .iter()
            .position(|post| post.slug == slug)
            .map(|post_index| (bucket_index, post_index))
    })
}

/// Reorder `buckets` so the boosted category comes first, with the boosted
/// post first inside it.
///
/// The boosted post is moved out of whichever bucket holds it. When no bucket
/// holds it, `fallback` (if any) is prepended instead. Buckets left empty by
/// the move are dropped. Without a boosted category the input is returned
/// unchanged.
pub fn apply_boost(
    mut buckets: Vec<CategoryWithPosts>,
    policy: &dyn BoostPolicy,
    fallback: Option<NormalizedPost>,
) -> Vec<CategoryWithPosts> {
    let Some(boosted_index) = boosted_category_index(&buckets, policy) else {
        return buckets;
    };

    if let Some(slug) = policy.boosted_slug() {
        let pinned = match locate_post(&buckets, slug) {
            Some((bucket_index, post_index)) => Some(buckets[bucket_index].posts.remove(post_index)),
            None => fallback.filter(|post| post.slug == slug),
        };
        if let Some(post) = pinned {
            buckets[boosted_index].posts.insert(0, post);
        }
    }

    let boosted = buckets.remove(boosted_index);
    buckets.insert(0, boosted);
    buckets.retain(|bucket| !bucket.posts.is_empty());
    buckets
}
