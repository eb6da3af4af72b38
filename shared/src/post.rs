//! Display types handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::wordpress::WpCategory;

/// Display-ready post, the shape every listing and detail view renders.
///
/// Produced by [`crate::normalize::transform_post`]; text fields are never
/// empty because the normalizer substitutes fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPost {
    /// Post id as a string.
    pub id: String,
    /// Plain-text title.
    pub title: String,
    /// Plain-text excerpt, at most 200 characters plus `"..."`.
    pub excerpt: String,
    /// Rendered HTML body as WordPress sent it. Entities are left encoded
    /// for the HTML renderer to resolve.
    pub content: String,
    /// URL slug.
    pub slug: String,
    /// Cover image URL.
    pub cover_image: String,
    /// Author card.
    pub author: PostAuthor,
    /// Publish timestamp.
    pub published_at: String,
    /// Estimated minutes to read, at least 1.
    pub reading_time: u32,
    /// Tag names.
    pub tags: Vec<String>,
    /// Primary category name.
    pub category: String,
    /// Placeholder view count. Not backed by analytics.
    pub views: u32,
    /// Editorial "featured" flag; the CMS feed never sets it.
    pub featured: bool,
    /// Locale tag of the content.
    pub locale: String,
}

/// Author block attached to a [`NormalizedPost`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAuthor {
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub avatar: String,
    /// Short biography.
    pub bio: String,
    /// Social profiles.
    pub social_links: SocialLinks,
}

/// Social profile links. No CMS field feeds these yet, so they stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    /// Twitter/X profile URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    /// Instagram profile URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    /// Personal website URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// A category paired with its most recent posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithPosts {
    /// The category record as WordPress returned it.
    pub category: WpCategory,
    /// Normalized posts, newest first.
    pub posts: Vec<NormalizedPost>,
}

/// Category listed with the number of posts actually fetched for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// Category id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Category slug.
    pub slug: String,
    /// Posts found, capped at one page of 100.
    pub count: usize,
    /// Parent category id; listings are flat, so always `0`.
    pub parent: u64,
}

impl CategorySummary {
    /// Summarize `category` with an observed post `count`.
    pub fn new(category: &WpCategory, count: usize) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            count,
            parent: 0,
        }
    }
}
