use crate::AppState;
use crate::db::{CategoryExt, CommentExt, LocationExt, PostExt};
use crate::dtos::{
    CategoryDto, CommentDto, FormErrorsDto, LocationDto, PageQueryDto, PostDetailResponseDto,
    PostDto, PostFormDto, PostFormPayloadDto, PostListResponseDto, PostResponseDto,
};
use crate::error::{ErrorMessage, HttpError};
use crate::handler::comment::comment_handler;
use crate::middleware::{AuthUser, Viewer, auth, identify};
use crate::pagination::{DEFAULT_PAGE_SIZE, Pager};
use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::routing::get;
use axum::{Router, middleware};
use chrono::{DateTime, NaiveTime, Utc};
use tracing::instrument;
use validator::Validate;

/// Router for post endpoints nested under /posts.
///
/// GET on a form route serves the form payload, POST submits it. The
/// static /create segment is registered alongside the {post_id} capture;
/// axum prefers the static match.
pub fn post_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/create",
            get(post_create_form)
                .post(post_create)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/{post_id}",
            get(post_detail)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), identify)),
        )
        .route(
            "/{post_id}/edit",
            get(post_edit_form)
                .post(post_edit)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/{post_id}/delete",
            get(post_delete_confirm)
                .post(post_delete)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .nest("/{post_id}", comment_handler(app_state))
}

fn detail_path(post_id: i64) -> String {
    format!("/posts/{}", post_id)
}

/// Turn the submitted form date into the stored instant (midnight UTC).
fn pub_date_instant(form: &PostFormDto) -> Result<DateTime<Utc>, HttpError> {
    let date = form
        .pub_date
        .ok_or_else(|| HttpError::bad_request("Publication date is required"))?;

    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

/// Front page: paginated listing of publicly visible posts.
#[instrument(skip(app_state))]
pub async fn index(
    Query(params): Query<PageQueryDto>,
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, HttpError> {
    let now = Utc::now();

    let total = app_state
        .db_client
        .count_public_posts(now)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting posts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let pager = Pager::clamped(params.page, DEFAULT_PAGE_SIZE, total);

    let posts = app_state
        .db_client
        .list_public_posts(now, pager.limit(), pager.offset())
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing posts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let response = Json(PostListResponseDto {
        status: "success".to_string(),
        data: PostDto::from_rows(&posts),
        pagination: pager.meta(),
    });
    tracing::info!("index successful");
    Ok(response)
}

/// Post detail with its comment thread.
///
/// The author sees their own post unconditionally; everyone else only a
/// publicly visible one. Both unknown and invisible ids answer 404.
#[instrument(skip(app_state, viewer))]
pub async fn post_detail(
    Path(post_id): Path<i64>,
    State(app_state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, HttpError> {
    let now = Utc::now();

    let post = app_state
        .db_client
        .get_post(post_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting post: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::PostNotFound.to_string()))?;

    if !post.is_visible_to(viewer.id(), now) {
        return Err(HttpError::not_found(ErrorMessage::PostNotFound.to_string()));
    }

    let comments = app_state
        .db_client
        .list_post_comments(post_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing comments: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let response = Json(PostDetailResponseDto {
        status: "success".to_string(),
        data: PostDto::from_row(&post),
        comments: CommentDto::from_rows(&comments),
    });
    tracing::info!("post_detail successful");
    Ok(response)
}

/// Blank post form with the category/location choices.
#[instrument(skip(app_state, user), fields(username = %user.user.username))]
pub async fn post_create_form(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let payload = form_payload(&app_state, PostFormDto::default(), true).await?;

    Ok(Json(payload))
}

/// Create a post. The author comes from the session identity, never from
/// the payload, and new posts are published (visibility is then governed
/// by pub_date and the category).
#[instrument(skip(app_state, user, body), fields(username = %user.user.username))]
pub async fn post_create(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PostFormDto>,
) -> Result<Response, HttpError> {
    if let Err(e) = body.validate() {
        tracing::error!("Invalid post_create input: {}", e);
        return Ok((StatusCode::OK, Json(FormErrorsDto::new(body, &e))).into_response());
    }

    let pub_date = pub_date_instant(&body)?;
    let text = ammonia::clean(&body.text);

    let post_id = app_state
        .db_client
        .create_post(
            user.user.id,
            &body.title,
            &text,
            pub_date,
            body.category,
            body.location,
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                tracing::error!("Unknown category or location: {}", db_err);
                HttpError::bad_request("Unknown category or location".to_string())
            }
            e => {
                tracing::error!("DB error, creating post: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!(post_id, "post_create successful");
    Ok(Redirect::to(&format!("/profile/{}", user.user.username)).into_response())
}

/// Prefilled edit form. Once a post's pub_date has passed, the date field
/// is no longer editable and the payload says so.
#[instrument(skip(app_state, user), fields(username = %user.user.username))]
pub async fn post_edit_form(
    Path(post_id): Path<i64>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, HttpError> {
    let now = Utc::now();

    let post = fetch_post(&app_state, post_id).await?;

    if post.author_id != user.user.id {
        return Ok(Redirect::to(&detail_path(post_id)).into_response());
    }

    let form = PostFormDto {
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: Some(post.pub_date.date_naive()),
        category: post.category_id,
        location: post.location_id,
    };

    let payload = form_payload(&app_state, form, post.pub_date > now).await?;

    tracing::info!("post_edit_form successful");
    Ok(Json(payload).into_response())
}

/// Edit a post. Non-authors are redirected to the detail page without an
/// error; a past pub_date is kept regardless of what was submitted.
#[instrument(skip(app_state, user, body), fields(username = %user.user.username))]
pub async fn post_edit(
    Path(post_id): Path<i64>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<PostFormDto>,
) -> Result<Response, HttpError> {
    let now = Utc::now();

    let post = fetch_post(&app_state, post_id).await?;

    if post.author_id != user.user.id {
        tracing::info!(post_id, "edit denied, redirecting to detail");
        return Ok(Redirect::to(&detail_path(post_id)).into_response());
    }

    if let Err(e) = body.validate() {
        tracing::error!("Invalid post_edit input: {}", e);
        return Ok((StatusCode::OK, Json(FormErrorsDto::new(body, &e))).into_response());
    }

    let pub_date = if post.pub_date <= now {
        post.pub_date
    } else {
        pub_date_instant(&body)?
    };

    let text = ammonia::clean(&body.text);

    app_state
        .db_client
        .update_post(
            post_id,
            user.user.id,
            &body.title,
            &text,
            pub_date,
            body.category,
            body.location,
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                tracing::error!("Unknown category or location: {}", db_err);
                HttpError::bad_request("Unknown category or location".to_string())
            }
            sqlx::Error::RowNotFound => {
                HttpError::not_found(ErrorMessage::PostNotFound.to_string())
            }
            e => {
                tracing::error!("DB error, updating post: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!(post_id, "post_edit successful");
    Ok(Redirect::to(&detail_path(post_id)).into_response())
}

/// Deletion confirmation payload.
#[instrument(skip(app_state, user), fields(username = %user.user.username))]
pub async fn post_delete_confirm(
    Path(post_id): Path<i64>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, HttpError> {
    let post = fetch_post(&app_state, post_id).await?;

    if post.author_id != user.user.id {
        return Ok(Redirect::to(&detail_path(post_id)).into_response());
    }

    let response = Json(PostResponseDto {
        status: "success".to_string(),
        data: PostDto::from_row(&post),
    });
    Ok(response.into_response())
}

/// Delete a post; its comments go with it (FK cascade).
#[instrument(skip(app_state, user), fields(username = %user.user.username))]
pub async fn post_delete(
    Path(post_id): Path<i64>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, HttpError> {
    let post = fetch_post(&app_state, post_id).await?;

    if post.author_id != user.user.id {
        tracing::info!(post_id, "delete denied, redirecting to detail");
        return Ok(Redirect::to(&detail_path(post_id)).into_response());
    }

    app_state
        .db_client
        .delete_post(post_id, user.user.id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                HttpError::not_found(ErrorMessage::PostNotFound.to_string())
            }
            e => {
                tracing::error!("DB error, deleting post: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!(post_id, "post_delete successful");
    Ok(Redirect::to("/").into_response())
}

async fn fetch_post(
    app_state: &AppState,
    post_id: i64,
) -> Result<crate::models::PostRow, HttpError> {
    app_state
        .db_client
        .get_post(post_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting post: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::PostNotFound.to_string()))
}

async fn form_payload(
    app_state: &AppState,
    form: PostFormDto,
    pub_date_editable: bool,
) -> Result<PostFormPayloadDto, HttpError> {
    let categories = app_state
        .db_client
        .list_published_categories()
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing categories: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let locations = app_state
        .db_client
        .list_published_locations()
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing locations: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(PostFormPayloadDto {
        status: "success".to_string(),
        form,
        pub_date_editable,
        categories: categories.iter().map(CategoryDto::filter_category).collect(),
        locations: locations.iter().map(LocationDto::filter_location).collect(),
    })
}
