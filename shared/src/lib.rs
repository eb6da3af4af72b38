//! Shared content model for the PawPress blog service.
//!
//! Holds the WordPress REST wire types, the display-ready post shape the
//! presentation layer consumes, the post normalizer that maps one onto the
//! other, and the JSON envelope used by the HTTP surface. Nothing in here
//! performs I/O.

pub mod envelope;
pub mod normalize;
pub mod post;
pub mod wordpress;

pub use envelope::ApiEnvelope;
pub use normalize::{transform_post, transform_post_with_rng};
pub use post::{CategorySummary, CategoryWithPosts, NormalizedPost, PostAuthor, SocialLinks};
pub use wordpress::{WpCategory, WpPost, WpTag, UNCATEGORIZED_CATEGORY_ID};
