//! Wire types for the WordPress REST API (`/wp-json/wp/v2`).
//!
//! Every field defaults when absent. WordPress installs vary a lot in what
//! they embed (plugins strip authors, media can be private), so decoding is
//! lenient and the normalizer decides what a missing value means.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Id of the built-in "Uncategorized" category on a stock WordPress install.
pub const UNCATEGORIZED_CATEGORY_ID: u64 = 1;

/// HTML-bearing field as WordPress renders it, e.g. `{"rendered": "<p>Hi</p>"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    /// Rendered HTML.
    #[serde(default)]
    pub rendered: String,
}

impl Rendered {
    /// Wrap already-rendered HTML.
    pub fn new(rendered: impl Into<String>) -> Self {
        Self {
            rendered: rendered.into(),
        }
    }
}

/// A post record as returned by `GET /posts?_embed=true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpPost {
    /// Numeric post id.
    pub id: u64,
    /// Post title, may contain markup and entities.
    pub title: Rendered,
    /// Excerpt, usually a `<p>` block ending in `[&hellip;]`.
    pub excerpt: Rendered,
    /// Full post body.
    pub content: Rendered,
    /// Publish date in the site's timezone, ISO 8601 without offset.
    pub date: String,
    /// URL slug.
    pub slug: String,
    /// Featured media id, `0` when none.
    pub featured_media: u64,
    /// Author user id.
    pub author: u64,
    /// Category ids.
    pub categories: Vec<u64>,
    /// Tag ids.
    pub tags: Vec<u64>,
    /// Related entities resolved by `_embed`.
    #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<WpEmbedded>,
}

/// The `_embedded` bundle attached to a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpEmbedded {
    /// Featured media entries; WordPress sends at most one.
    #[serde(rename = "wp:featuredmedia")]
    pub featured_media: Vec<WpMedia>,
    /// Author entries; WordPress sends at most one.
    pub author: Vec<WpAuthor>,
    /// Taxonomy term groups: index 0 holds categories, index 1 holds tags.
    #[serde(rename = "wp:term")]
    pub terms: Vec<Vec<WpTerm>>,
}

/// An embedded media item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpMedia {
    /// Media id.
    pub id: u64,
    /// Public URL of the original file.
    pub source_url: String,
    /// Alternative text.
    pub alt_text: String,
}

/// An embedded author (public user view).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpAuthor {
    /// User id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// User slug.
    pub slug: String,
    /// Biographical info.
    pub description: String,
    /// Gravatar URLs keyed by pixel size (`"24"`, `"48"`, `"96"`).
    pub avatar_urls: BTreeMap<String, String>,
}

/// An embedded taxonomy term (category or tag).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpTerm {
    /// Term id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Term slug.
    pub slug: String,
    /// `category` or `post_tag`.
    pub taxonomy: String,
}

/// A category from `GET /categories`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpCategory {
    /// Category id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Category slug.
    pub slug: String,
    /// Description, may be empty.
    pub description: String,
    /// Number of published posts, as WordPress counts them.
    pub count: u64,
    /// Parent category id, `0` at the top level.
    pub parent: u64,
}

/// A tag from `GET /tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WpTag {
    /// Tag id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Tag slug.
    pub slug: String,
}

impl WpPost {
    /// First embedded featured media item.
    pub fn featured_image(&self) -> Option<&WpMedia> {
        self.embedded.as_ref()?.featured_media.first()
    }

    /// First embedded author.
    pub fn embedded_author(&self) -> Option<&WpAuthor> {
        self.embedded.as_ref()?.author.first()
    }

    /// Term group at `index`, empty when absent.
    pub fn term_group(&self, index: usize) -> &[WpTerm] {
        self.embedded
            .as_ref()
            .and_then(|embedded| embedded.terms.get(index))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
