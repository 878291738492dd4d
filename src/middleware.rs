use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::{
    AppState,
    db::UserExt,
    error::{ErrorMessage, HttpError},
    models::User,
    utils::token,
};

pub const LOGIN_PATH: &str = "/auth/login";

/// Authenticated user attached to the request by the `auth` middleware.
///
/// Handlers behind `auth` extract it with `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// Possibly-anonymous viewer attached by the `identify` middleware.
///
/// Public pages still need to know who is looking: an author browsing
/// their own profile or an own unpublished post sees more than anyone
/// else does.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user: Option<User>,
}

impl Viewer {
    pub fn id(&self) -> Option<Uuid> {
        self.user.as_ref().map(|u| u.id)
    }
}

/// Extract the access token from the `access_token` cookie, falling back
/// to an `Authorization: Bearer <token>` header.
fn extract_token(cookie_jar: &CookieJar, req: &Request) -> Option<String> {
    cookie_jar
        .get("access_token")
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|auth_header| auth_header.to_str().ok())
                .and_then(|auth_value| {
                    auth_value
                        .strip_prefix("Bearer ")
                        .map(|token| token.to_owned())
                })
        })
}

/// Decode the token and fetch its user. An invalid or expired token, or a
/// user deleted after the token was issued, resolves to None; only a
/// store failure is an error.
async fn lookup_token_user(
    app_state: &AppState,
    token: String,
) -> Result<Option<User>, HttpError> {
    let Ok(subject) = token::decode_token(token, app_state.env.jwt_secret.as_bytes()) else {
        return Ok(None);
    };

    let Ok(user_id) = Uuid::parse_str(&subject) else {
        return Ok(None);
    };

    let user = app_state
        .db_client
        .get_user(Some(user_id), None, None)
        .await
        .map_err(|e| {
            tracing::error!("DB error, resolving token user: {}", e);
            HttpError::server_error(ErrorMessage::ServerError.to_string())
        })?;

    Ok(user)
}

/// Require an authenticated viewer.
///
/// Anonymous or stale credentials are not an error here: the request is
/// redirected to the login flow, matching what a browser-facing app does
/// with a protected page.
pub async fn auth(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let Some(token) = extract_token(&cookie_jar, &req) else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    let Some(user) = lookup_token_user(&app_state, token).await? else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };

    req.extensions_mut().insert(AuthUser { user });

    Ok(next.run(req).await)
}

/// Resolve the viewer on routes that serve anonymous visitors too.
/// Never fails: a bad token just means an anonymous viewer.
pub async fn identify(
    cookie_jar: CookieJar,
    State(app_state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let user = match extract_token(&cookie_jar, &req) {
        Some(token) => lookup_token_user(&app_state, token).await?,
        None => None,
    };

    req.extensions_mut().insert(Viewer { user });

    Ok(next.run(req).await)
}
