use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::AppState;

mod error;
mod handlers;
mod routes;

pub use error::AppError;

/// JSON body extractor whose rejection is an [`AppError`], so malformed or
/// over-specified bodies come back as 400.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::comments())
        // The front-end runs as a separate local process on another port.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
