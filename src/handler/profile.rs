use crate::AppState;
use crate::db::{PostExt, UserExt};
use crate::dtos::{
    FormErrorsDto, PageQueryDto, PostDto, ProfileDto, ProfileFormDto, ProfileFormPayloadDto,
    ProfilePostsResponseDto,
};
use crate::error::{ErrorMessage, HttpError};
use crate::middleware::{AuthUser, Viewer, auth, identify};
use crate::pagination::{DEFAULT_PAGE_SIZE, Pager};
use axum::Extension;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::routing::get;
use axum::{Router, middleware};
use chrono::Utc;
use tracing::instrument;
use validator::Validate;

/// Router for profile endpoints nested under /profile.
///
/// /edit is registered before the {username} capture; axum prefers the
/// static segment, so a user named "edit" cannot shadow the form.
pub fn profile_handler(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/edit",
            get(profile_edit_form)
                .post(profile_edit)
                .route_layer(middleware::from_fn_with_state(app_state.clone(), auth)),
        )
        .route(
            "/{username}",
            get(profile_detail)
                .route_layer(middleware::from_fn_with_state(app_state, identify)),
        )
}

/// Profile page: the user's public data and a page of their posts.
///
/// The owner sees every post they wrote, unpublished and future-dated
/// ones included; everyone else gets the default visibility filter.
#[instrument(skip(app_state, viewer))]
pub async fn profile_detail(
    Path(username): Path<String>,
    Query(params): Query<PageQueryDto>,
    State(app_state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = app_state
        .db_client
        .get_user(None, Some(&username), None)
        .await
        .map_err(|e| {
            tracing::error!("DB error, getting user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::ProfileNotFound.to_string()))?;

    let own_profile = viewer.id() == Some(profile.id);
    let now = Utc::now();

    let total = app_state
        .db_client
        .count_author_posts(profile.id, !own_profile, now)
        .await
        .map_err(|e| {
            tracing::error!("DB error, counting profile posts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let pager = Pager::clamped(params.page, DEFAULT_PAGE_SIZE, total);

    let posts = app_state
        .db_client
        .list_author_posts(profile.id, !own_profile, now, pager.limit(), pager.offset())
        .await
        .map_err(|e| {
            tracing::error!("DB error, listing profile posts: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    let response = Json(ProfilePostsResponseDto {
        status: "success".to_string(),
        profile: ProfileDto::filter_user(&profile),
        data: PostDto::from_rows(&posts),
        pagination: pager.meta(),
    });
    tracing::info!("profile_detail successful");
    Ok(response)
}

/// Prefilled profile edit form for the logged-in user.
#[instrument(skip(user), fields(username = %user.user.username))]
pub async fn profile_edit_form(
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let response = Json(ProfileFormPayloadDto {
        status: "success".to_string(),
        form: ProfileFormDto {
            username: user.user.username,
            first_name: user.user.first_name,
            last_name: user.user.last_name,
            email: user.user.email,
        },
    });
    Ok(response)
}

/// Update the logged-in user's own profile.
#[instrument(skip(app_state, user, body), fields(username = %user.user.username))]
pub async fn profile_edit(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ProfileFormDto>,
) -> Result<Response, HttpError> {
    if let Err(e) = body.validate() {
        tracing::error!("Invalid profile_edit input: {}", e);
        return Ok((StatusCode::OK, Json(FormErrorsDto::new(body, &e))).into_response());
    }

    let updated = app_state
        .db_client
        .update_profile(
            user.user.id,
            &body.username,
            &body.first_name,
            &body.last_name,
            &body.email,
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                tracing::error!("Profile update unique_violation: {}", db_err);
                HttpError::unique_constraint_violation(
                    "Username or email is already in use".to_string(),
                )
            }
            e => {
                tracing::error!("DB error, updating profile: {}", e);
                HttpError::server_error(ErrorMessage::ServerError.to_string())
            }
        })?;

    tracing::info!("profile_edit successful");
    Ok(Redirect::to(&format!("/profile/{}", updated.username)).into_response())
}
