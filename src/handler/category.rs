use crate::AppState;
use crate::db::{CategoryExt, PostExt};
use crate::dtos::{CategoryDto, CategoryPostsResponseDto, PageQueryDto, PostDto};
use crate::error::{ErrorMessage, HttpError};
use crate::pagination::{DEFAULT_PAGE_SIZE, Pager};
use axum::Router;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use chrono::Utc;
use tracing::instrument;

/// Router for category pages nested under /category.
pub fn category_handler() -> Router<AppState> {
    Router::new().route("/{slug}", get(category_posts))
}

/// Paginated listing of the publicly visible posts in one category.
/// An unknown or unpublished category slug is a 404.
#[instrument(skip(app_state))]
pub async fn category_posts(
    Path(slug): Path<String>,
    Query(params): Query<PageQueryDto>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let category = app_state
        .db_client
        .get_published_category(&slug)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting category: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::CategoryNotFound.to_string()))?;

    let now = Utc::now();

    let total = app_state
        .db_client
        .count_category_posts(category.id, now)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting category posts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let pager = Pager::clamped(params.page, DEFAULT_PAGE_SIZE, total);

    let posts = app_state
        .db_client
        .list_category_posts(category.id, now, pager.limit(), pager.offset())
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing category posts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let response = Json(CategoryPostsResponseDto {
        status: "success".to_string(),
        category: CategoryDto::filter_category(&category),
        data: PostDto::from_rows(&posts),
        pagination: pager.meta(),
    });
    tracing::info!("category_posts successful");
    Ok(response)
}
