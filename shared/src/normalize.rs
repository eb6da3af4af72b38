//! Post normalization: raw WordPress record to [`NormalizedPost`].
//!
//! Normalization is total. Any [`WpPost`], including one decoded from `{}`,
//! yields a post whose title, excerpt, cover image and author fields are
//! populated, falling back to the site's stock values.

use std::{borrow::Cow, ops::Range};

use chrono::Utc;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

use crate::{
    post::{NormalizedPost, PostAuthor, SocialLinks},
    wordpress::WpPost,
};

/// Reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: usize = 200;
/// Maximum excerpt length in characters, before the ellipsis marker.
pub const EXCERPT_MAX_CHARS: usize = 200;
/// Marker appended to every non-placeholder excerpt.
pub const EXCERPT_ELLIPSIS: &str = "...";

/// Title used when the CMS title is empty.
pub const DEFAULT_TITLE: &str = "Untitled Article";
/// Excerpt used when the CMS excerpt is empty.
pub const DEFAULT_EXCERPT: &str = "No excerpt available";
/// Slug used when the CMS slug is empty.
pub const DEFAULT_SLUG: &str = "untitled-article";
/// Cover image used when no featured media is embedded.
pub const DEFAULT_COVER_IMAGE: &str =
    "https://images.unsplash.com/photo-1601758228041-f3b2795255f1?w=800&h=400&fit=crop";
/// Author name used when no author is embedded.
pub const DEFAULT_AUTHOR_NAME: &str = "Pet Care Expert";
/// Avatar used when the embedded author has no 96px avatar.
pub const DEFAULT_AUTHOR_AVATAR: &str =
    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=100&h=100&fit=crop&crop=face";
/// Bio used when the embedded author has no description.
pub const DEFAULT_AUTHOR_BIO: &str = "Pet care enthusiast and writer";
/// Category used when the post has no embedded category term.
pub const DEFAULT_CATEGORY: &str = "General";
/// Locale tag stamped on every post from the WordPress feed.
pub const DEFAULT_LOCALE: &str = "en";

const AVATAR_SIZE_KEY: &str = "96";
const CATEGORY_TERM_GROUP: usize = 0;
const TAG_TERM_GROUP: usize = 1;

// Placeholder until a real analytics source exists.
const PLACEHOLDER_VIEWS: Range<u32> = 500..2500;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));

/// Normalize one post using the thread-local RNG for the placeholder view
/// count.
pub fn transform_post(post: &WpPost) -> NormalizedPost {
    transform_post_with_rng(post, &mut rand::thread_rng())
}

/// Normalize one post, drawing the placeholder view count from `rng`.
pub fn transform_post_with_rng<R: Rng>(post: &WpPost, rng: &mut R) -> NormalizedPost {
    let author = post.embedded_author();

    NormalizedPost {
        id: post.id.to_string(),
        title: or_default(plain_text(&post.title.rendered), DEFAULT_TITLE),
        excerpt: truncate_excerpt(&plain_text(&post.excerpt.rendered)),
        content: post.content.rendered.clone(),
        slug: or_default(post.slug.trim().to_string(), DEFAULT_SLUG),
        cover_image: first_non_empty(
            post.featured_image().map(|media| media.source_url.as_str()),
            DEFAULT_COVER_IMAGE,
        ),
        author: PostAuthor {
            name: or_default(
                author.map(|a| plain_text(&a.name)).unwrap_or_default(),
                DEFAULT_AUTHOR_NAME,
            ),
            avatar: first_non_empty(
                author
                    .and_then(|a| a.avatar_urls.get(AVATAR_SIZE_KEY))
                    .map(String::as_str),
                DEFAULT_AUTHOR_AVATAR,
            ),
            bio: or_default(
                author.map(|a| plain_text(&a.description)).unwrap_or_default(),
                DEFAULT_AUTHOR_BIO,
            ),
            social_links: SocialLinks::default(),
        },
        published_at: if post.date.trim().is_empty() {
            Utc::now().to_rfc3339()
        } else {
            post.date.clone()
        },
        reading_time: reading_time(&post.content.rendered),
        tags: post
            .term_group(TAG_TERM_GROUP)
            .iter()
            .map(|term| plain_text(&term.name))
            .filter(|name| !name.is_empty())
            .collect(),
        category: or_default(
            post.term_group(CATEGORY_TERM_GROUP)
                .first()
                .map(|term| plain_text(&term.name))
                .unwrap_or_default(),
            DEFAULT_CATEGORY,
        ),
        views: rng.gen_range(PLACEHOLDER_VIEWS),
        featured: false,
        locale: DEFAULT_LOCALE.to_string(),
    }
}

/// Remove every `<...>` tag, keeping the text between them.
pub fn strip_tags(html: &str) -> Cow<'_, str> {
    TAG_PATTERN.replace_all(html, "")
}

/// Decode HTML entities, then fold typographic quotes and non-breaking
/// spaces to their plain ASCII forms. Dashes and ellipses keep their
/// Unicode characters.
pub fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text)
        .chars()
        .map(|ch| match ch {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{00A0}' => ' ',
            other => other,
        })
        .collect()
}

/// CMS rich text as trimmed plain text.
pub fn plain_text(html: &str) -> String {
    decode_entities(&strip_tags(html)).trim().to_string()
}

/// Cut a plain-text excerpt to [`EXCERPT_MAX_CHARS`] characters and append
/// [`EXCERPT_ELLIPSIS`]; an empty excerpt becomes [`DEFAULT_EXCERPT`].
pub fn truncate_excerpt(text: &str) -> String {
    if text.is_empty() {
        return DEFAULT_EXCERPT.to_string();
    }
    let mut excerpt: String = text.chars().take(EXCERPT_MAX_CHARS).collect();
    excerpt.push_str(EXCERPT_ELLIPSIS);
    excerpt
}

/// Minutes needed to read `html` at [`WORDS_PER_MINUTE`], rounded up and
/// never below 1.
pub fn reading_time(html: &str) -> u32 {
    let words = decode_entities(&strip_tags(html)).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

fn or_default(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

fn first_non_empty(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::wordpress::{Rendered, WpAuthor, WpEmbedded, WpMedia, WpTerm};

    fn term(name: &str, taxonomy: &str) -> WpTerm {
        WpTerm {
            name: name.to_string(),
            taxonomy: taxonomy.to_string(),
            ..WpTerm::default()
        }
    }

    fn words(count: usize) -> String {
        vec!["woof"; count].join(" ")
    }

    fn sample_post() -> WpPost {
        let author = WpAuthor {
            name: "Dr. Maya Chen".to_string(),
            description: "Small-animal vet".to_string(),
            avatar_urls: [("96".to_string(), "https://cdn.test/maya-96.png".to_string())]
                .into_iter()
                .collect(),
            ..WpAuthor::default()
        };
        WpPost {
            id: 314,
            title: Rendered::new("Dog&#8217;s Best Friend"),
            excerpt: Rendered::new("<p>Routine checkups catch problems early [&hellip;]</p>\n"),
            content: Rendered::new(format!("<p>{}</p>", words(400))),
            date: "2024-03-02T10:00:00".to_string(),
            slug: "dogs-best-friend".to_string(),
            embedded: Some(WpEmbedded {
                featured_media: vec![WpMedia {
                    source_url: "https://cdn.test/cover.jpg".to_string(),
                    ..WpMedia::default()
                }],
                author: vec![author],
                terms: vec![
                    vec![term("Pet Wellness Exams", "category"), term("Dogs", "category")],
                    vec![term("checkups", "post_tag"), term("Food &amp; Diet", "post_tag")],
                ],
            }),
            ..WpPost::default()
        }
    }

    #[test]
    fn normalizes_fully_embedded_post() {
        let post = transform_post(&sample_post());

        assert_eq!(post.id, "314");
        assert_eq!(post.title, "Dog's Best Friend");
        assert_eq!(post.excerpt, "Routine checkups catch problems early […]...");
        assert_eq!(post.slug, "dogs-best-friend");
        assert_eq!(post.cover_image, "https://cdn.test/cover.jpg");
        assert_eq!(post.author.name, "Dr. Maya Chen");
        assert_eq!(post.author.avatar, "https://cdn.test/maya-96.png");
        assert_eq!(post.author.bio, "Small-animal vet");
        assert_eq!(post.author.social_links, SocialLinks::default());
        assert_eq!(post.published_at, "2024-03-02T10:00:00");
        assert_eq!(post.reading_time, 2);
        assert_eq!(post.category, "Pet Wellness Exams");
        assert_eq!(post.tags, vec!["checkups".to_string(), "Food & Diet".to_string()]);
        assert!(!post.featured);
        assert_eq!(post.locale, "en");
    }

    #[test]
    fn empty_record_gets_every_fallback() {
        let post = transform_post(&WpPost::default());

        assert_eq!(post.id, "0");
        assert_eq!(post.title, DEFAULT_TITLE);
        assert_eq!(post.excerpt, DEFAULT_EXCERPT);
        assert_eq!(post.slug, DEFAULT_SLUG);
        assert_eq!(post.cover_image, DEFAULT_COVER_IMAGE);
        assert_eq!(post.author.name, DEFAULT_AUTHOR_NAME);
        assert_eq!(post.author.avatar, DEFAULT_AUTHOR_AVATAR);
        assert_eq!(post.author.bio, DEFAULT_AUTHOR_BIO);
        assert_eq!(post.category, DEFAULT_CATEGORY);
        assert!(post.tags.is_empty());
        assert_eq!(post.reading_time, 1);
        assert!(!post.published_at.is_empty());
        assert!(post.content.is_empty());
    }

    #[test]
    fn blank_embedded_values_fall_back() {
        let mut raw = sample_post();
        raw.title = Rendered::new("<strong> </strong>");
        if let Some(embedded) = raw.embedded.as_mut() {
            embedded.featured_media[0].source_url = "   ".to_string();
            embedded.author[0] = WpAuthor::default();
            embedded.terms = vec![vec![]];
        }

        let post = transform_post(&raw);
        assert_eq!(post.title, DEFAULT_TITLE);
        assert_eq!(post.cover_image, DEFAULT_COVER_IMAGE);
        assert_eq!(post.author.name, DEFAULT_AUTHOR_NAME);
        assert_eq!(post.author.avatar, DEFAULT_AUTHOR_AVATAR);
        assert_eq!(post.category, DEFAULT_CATEGORY);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn content_keeps_markup_and_entities() {
        let html = "<p>Dog&#8217;s <em>first</em> visit &amp; shots</p>";
        let post = transform_post(&WpPost {
            content: Rendered::new(html),
            ..WpPost::default()
        });
        assert_eq!(post.content, html);
    }

    #[test]
    fn short_excerpt_keeps_every_character() {
        let stripped = plain_text("<p>Cats need <em>annual</em> dental checks, too.</p>");
        let excerpt = truncate_excerpt(&stripped);

        assert!(stripped.chars().count() < EXCERPT_MAX_CHARS);
        assert_eq!(excerpt.strip_suffix(EXCERPT_ELLIPSIS), Some(stripped.as_str()));
    }

    #[test]
    fn long_excerpt_is_cut_on_char_boundaries() {
        let text = "é".repeat(EXCERPT_MAX_CHARS + 50);
        let excerpt = truncate_excerpt(&text);

        assert_eq!(excerpt.chars().count(), EXCERPT_MAX_CHARS + EXCERPT_ELLIPSIS.len());
        assert!(excerpt.ends_with(EXCERPT_ELLIPSIS));
    }

    #[test]
    fn decodes_known_and_general_entities() {
        assert_eq!(decode_entities("Dog&#8217;s Best Friend"), "Dog's Best Friend");
        assert_eq!(decode_entities("&#8216;hi&#8217; &#8220;there&#8221;"), "'hi' \"there\"");
        assert_eq!(decode_entities("a&#8211;b&#8212;c&#8230;"), "a–b—c…");
        assert_eq!(decode_entities("&amp; &lt;tag&gt; &quot;q&quot; &#39;s"), "& <tag> \"q\" 's");
        assert_eq!(decode_entities("fur&nbsp;ball"), "fur ball");
        assert_eq!(decode_entities("caf&eacute; &copy; &#x1F436;"), "café © 🐶");
    }

    #[test]
    fn strips_tags_before_decoding() {
        assert_eq!(plain_text("<h2 class=\"x\">Tick &amp; Flea</h2>"), "Tick & Flea");
        assert_eq!(plain_text("&lt;b&gt;literal&lt;/b&gt;"), "<b>literal</b>");
    }

    #[test]
    fn reading_time_examples() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time(&words(1)), 1);
        assert_eq!(reading_time(&words(200)), 1);
        assert_eq!(reading_time(&words(201)), 2);
        assert_eq!(reading_time(&format!("<div><p>{}</p></div>", words(400))), 2);
        assert_eq!(reading_time(&words(1001)), 6);
    }

    #[test]
    fn reading_time_is_monotonic_and_positive() {
        let mut previous = 0;
        for count in (0..=2_000).step_by(37) {
            let minutes = reading_time(&words(count));
            assert!(minutes >= 1);
            assert!(minutes >= previous, "{count} words regressed to {minutes}");
            previous = minutes;
        }
    }

    #[test]
    fn placeholder_views_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..256 {
            let post = transform_post_with_rng(&WpPost::default(), &mut rng);
            assert!(PLACEHOLDER_VIEWS.contains(&post.views));
        }
    }

    #[test]
    fn serializes_camel_case_contract() {
        let body = serde_json::to_value(transform_post(&sample_post())).expect("serialize post");

        assert_eq!(body["coverImage"], "https://cdn.test/cover.jpg");
        assert_eq!(body["readingTime"], 2);
        assert_eq!(body["publishedAt"], "2024-03-02T10:00:00");
        assert_eq!(body["author"]["socialLinks"], serde_json::json!({}));
    }
}
