use axum::{routing::get, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn comments() -> Router<AppState> {
    Router::new()
        .route(
            "/api/comments/",
            get(handlers::list_comments).post(handlers::create_comment),
        )
        .route(
            "/api/comments/:id/",
            get(handlers::get_comment)
                .put(handlers::replace_comment)
                .patch(handlers::patch_comment)
                .delete(handlers::delete_comment),
        )
}
