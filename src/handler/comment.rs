use crate::AppState;
use crate::db::{CommentExt, PostExt};
use crate::dtos::{CommentDto, CommentFormDto, CommentFormPayloadDto, CommentResponseDto, FormErrorsDto};
use crate::error::{ErrorMessage, HttpError};
use crate::middleware::{AuthUser, auth};
use axum::Extension;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use axum::{Router, middleware};
use chrono::Utc;
use tracing::instrument;
use validator::Validate;

/// Router for comment endpoints, nested under /posts/{post_id}.
///
/// All comment operations require an authenticated viewer; the route
/// paths mirror the page URLs a browser client navigates.
pub fn comment_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/comment",
            post(comment_add)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/edit_comment/{comment_id}",
            get(comment_edit_form)
                .post(comment_edit)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/delete_comment/{comment_id}",
            get(comment_delete_confirm)
                .post(comment_delete)
                .route_layer(middleware::from_fn_with_state(app_state, auth)),
        )
}

fn detail_path(post_id: i64) -> String {
    format!("/posts/{}", post_id)
}

/// Comment on a post. The parent post and the author are taken from the
/// route and the session, never from the payload, and the post must be
/// visible to the commenting viewer.
#[instrument(skip(app_state, user, body), fields(username = %user.user.username))]
pub async fn comment_add(
    Path(post_id): Path<i64>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CommentFormDto>,
) -> Result<Response, HttpError> {
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

    if !post.is_visible_to(Some(user.user.id), now) {
        return Err(HttpError::not_found(ErrorMessage::PostNotFound.to_string()));
    }

    if let Err(e) = body.validate() {
        tracing::error!("Invalid comment_add input: {}", e);
        return Ok((StatusCode::OK, Json(FormErrorsDto::new(body, &e))).into_response());
    }

    let text = ammonia::clean(&body.text);

    app_state
        .db_client
        .create_comment(user.user.id, post_id, &text)
        .await
        .map_err(|e| {
            tracing::error!("DB error, creating comment: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    tracing::info!(post_id, "comment_add successful");
    Ok(Redirect::to(&detail_path(post_id)).into_response())
}

/// Prefilled comment edit form.
#[instrument(skip(app_state, user), fields(username = %user.user.username))]
pub async fn comment_edit_form(
    Path((post_id, comment_id)): Path<(i64, i64)>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, HttpError> {
    let comment = fetch_comment(&app_state, post_id, comment_id).await?;

    if comment.author_id != user.user.id {
        return Ok(Redirect::to(&detail_path(post_id)).into_response());
    }

    let response = Json(CommentFormPayloadDto {
        status: "success".to_string(),
        form: CommentFormDto { text: comment.text },
    });
    Ok(response.into_response())
}

/// Edit a comment. A non-author is redirected to the post detail page
/// and the comment stays unchanged.
#[instrument(skip(app_state, user, body), fields(username = %user.user.username))]
pub async fn comment_edit(
    Path((post_id, comment_id)): Path<(i64, i64)>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CommentFormDto>,
) -> Result<Response, HttpError> {
    let comment = fetch_comment(&app_state, post_id, comment_id).await?;

    if comment.author_id != user.user.id {
        tracing::info!(comment_id, "edit denied, redirecting to detail");
        return Ok(Redirect::to(&detail_path(post_id)).into_response());
    }

    if let Err(e) = body.validate() {
        tracing::error!("Invalid comment_edit input: {}", e);
        return Ok((StatusCode::OK, Json(FormErrorsDto::new(body, &e))).into_response());
    }

    let text = ammonia::clean(&body.text);

    app_state
        .db_client
        .update_comment(comment_id, user.user.id, &text)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                HttpError::not_found(ErrorMessage::CommentNotFound.to_string())
            }
            e => {
                tracing::error!("DB error, updating comment: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!(comment_id, "comment_edit successful");
    Ok(Redirect::to(&detail_path(post_id)).into_response())
}

/// Deletion confirmation payload for a comment.
#[instrument(skip(app_state, user), fields(username = %user.user.username))]
pub async fn comment_delete_confirm(
    Path((post_id, comment_id)): Path<(i64, i64)>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, HttpError> {
    let comment = fetch_comment(&app_state, post_id, comment_id).await?;

    if comment.author_id != user.user.id {
        return Ok(Redirect::to(&detail_path(post_id)).into_response());
    }

    let response = Json(CommentResponseDto {
        status: "success".to_string(),
        data: CommentDto::from_row(&comment),
    });
    Ok(response.into_response())
}

/// Delete a comment.
#[instrument(skip(app_state, user), fields(username = %user.user.username))]
pub async fn comment_delete(
    Path((post_id, comment_id)): Path<(i64, i64)>,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Response, HttpError> {
    let comment = fetch_comment(&app_state, post_id, comment_id).await?;

    if comment.author_id != user.user.id {
        tracing::info!(comment_id, "delete denied, redirecting to detail");
        return Ok(Redirect::to(&detail_path(post_id)).into_response());
    }

    app_state
        .db_client
        .delete_comment(comment_id, user.user.id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                HttpError::not_found(ErrorMessage::CommentNotFound.to_string())
            }
            e => {
                tracing::error!("DB error, deleting comment: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!(comment_id, "comment_delete successful");
    Ok(Redirect::to(&detail_path(post_id)).into_response())
}

/// Fetch a comment and require it to belong to the post in the path.
async fn fetch_comment(
    app_state: &AppState,
    post_id: i64,
    comment_id: i64,
) -> Result<crate::models::CommentRow, HttpError> {
    let comment = app_state
        .db_client
        .get_comment(comment_id)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting comment: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::CommentNotFound.to_string()))?;

    if comment.post_id != post_id {
        return Err(HttpError::not_found(
            ErrorMessage::CommentNotFound.to_string(),
        ));
    }

    Ok(comment)
}
