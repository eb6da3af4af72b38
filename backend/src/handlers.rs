use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use pawpress_shared::{
    ApiEnvelope, CategorySummary, CategoryWithPosts, NormalizedPost, WpTag,
};
use serde::Deserialize;

use crate::{
    aggregate::{self, AggregationOptions},
    state::AppState,
    wordpress::{transform_post, ContentError, PostOrderBy, PostQuery, SortOrder, MAX_PER_PAGE},
};

type ApiError = (StatusCode, Json<ApiEnvelope<()>>);
type ApiResult<T> = Result<Json<ApiEnvelope<T>>, ApiError>;

const DEFAULT_POSTS_PER_CATEGORY: u32 = 3;

/// Raw `/posts` query string. Kept as strings so malformed values produce
/// an envelope error instead of the extractor's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PostsParams {
    pub per_page: Option<String>,
    pub page: Option<String>,
    pub categories: Option<String>,
    pub tags: Option<String>,
    pub search: Option<String>,
    pub orderby: Option<String>,
    pub order: Option<String>,
}

impl PostsParams {
    pub fn into_query(self) -> Result<PostQuery, String> {
        Ok(PostQuery {
            per_page: parse_page_size(self.per_page.as_deref())?,
            page: parse_optional::<u32>("page", self.page.as_deref())?
                .map(|page| page.max(1)),
            categories: parse_ids("categories", self.categories.as_deref())?,
            tags: parse_ids("tags", self.tags.as_deref())?,
            search: non_empty(self.search),
            orderby: parse_optional::<PostOrderBy>("orderby", self.orderby.as_deref())?,
            order: parse_optional::<SortOrder>("order", self.order.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoriesParams {
    pub per_page: Option<String>,
    pub include_uncategorized: Option<String>,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostsParams>,
) -> ApiResult<Vec<NormalizedPost>> {
    let query = params.into_query().map_err(bad_request)?;

    let posts = state
        .content()
        .get_posts(&query)
        .await
        .map_err(|err| upstream_error("Failed to fetch posts from WordPress", err))?;

    let total = posts.len();
    let posts = posts.iter().map(transform_post).collect();
    Ok(Json(ApiEnvelope::ok(posts).with_total(total)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<NormalizedPost> {
    let post = state
        .content()
        .get_post_by_slug(&slug)
        .await
        .map_err(|err| upstream_error("Failed to fetch post from WordPress", err))?;

    match post {
        Some(post) => Ok(Json(ApiEnvelope::ok(transform_post(&post)))),
        None => Err((StatusCode::NOT_FOUND, Json(ApiEnvelope::failure("Post not found", None)))),
    }
}

pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<CategoriesParams>,
) -> ApiResult<Vec<CategoryWithPosts>> {
    let per_page = parse_page_size(params.per_page.as_deref())
        .map_err(bad_request)?
        .unwrap_or(DEFAULT_POSTS_PER_CATEGORY);
    let include_uncategorized = params
        .include_uncategorized
        .as_deref()
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));

    let options = AggregationOptions {
        posts_per_category: per_page,
        uncategorized_posts: include_uncategorized.then_some(per_page),
        ..AggregationOptions::default()
    };
    let buckets = aggregate::categories_with_posts(state.content(), &options)
        .await
        .map_err(|err| upstream_error("Failed to fetch categories", err))?;

    let total = buckets.len();
    Ok(Json(ApiEnvelope::ok(buckets).with_total(total)))
}

pub async fn featured_categories(
    State(state): State<AppState>,
) -> ApiResult<Vec<CategoryWithPosts>> {
    let buckets = aggregate::prioritized_categories(
        state.content(),
        &AggregationOptions::home(),
        state.boost(),
    )
    .await
    .map_err(|err| upstream_error("Failed to fetch categories", err))?;

    let total = buckets.len();
    Ok(Json(ApiEnvelope::ok(buckets).with_total(total)))
}

pub async fn category_counts(State(state): State<AppState>) -> ApiResult<Vec<CategorySummary>> {
    let summaries = aggregate::category_post_counts(state.content())
        .await
        .map_err(|err| upstream_error("Failed to fetch categories.", err))?;

    let total = summaries.len();
    Ok(Json(ApiEnvelope::ok(summaries).with_total(total)))
}

pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Vec<WpTag>> {
    let tags = state
        .content()
        .get_tags()
        .await
        .map_err(|err| upstream_error("Failed to fetch tags from WordPress", err))?;

    let total = tags.len();
    Ok(Json(ApiEnvelope::ok(tags).with_total(total)))
}

fn upstream_error(summary: &str, err: ContentError) -> ApiError {
    tracing::error!("{}: {}", summary, err);
    let status = match err {
        ContentError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ContentError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiEnvelope::failure(summary, Some(err.to_string()))))
}

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiEnvelope::failure("Invalid query parameters", Some(message))),
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_optional<T: FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, String> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| format!("`{name}` has an invalid value: {raw}"))
}

fn parse_page_size(raw: Option<&str>) -> Result<Option<u32>, String> {
    match parse_optional::<u32>("per_page", raw)? {
        Some(size) if size == 0 || size > MAX_PER_PAGE => {
            Err(format!("`per_page` must be between 1 and {MAX_PER_PAGE}"))
        },
        other => Ok(other),
    }
}

fn parse_ids(name: &str, raw: Option<&str>) -> Result<Vec<u64>, String> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>()
                .map_err(|_| format!("`{name}` must be comma-separated ids, got `{id}`"))
        })
        .collect()
}
