use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    handler::{
        auth::auth_handler, category::category_handler, post, post::post_handler,
        profile::profile_handler,
    },
};

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(post::index))
        .nest("/auth", auth_handler(app_state.clone()))
        .nest("/category", category_handler())
        .nest("/posts", post_handler(app_state.clone()))
        .nest("/profile", profile_handler(app_state.clone()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
