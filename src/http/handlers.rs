use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::app::comments::CommentService;
use crate::app::users::UserService;
use crate::domain::comment::Comment;
use crate::domain::user::User;
use crate::http::{AppError, Json};
use crate::AppState;

const MAX_TEXT_LEN: usize = 10_000;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

pub async fn list_comments(State(state): State<AppState>) -> Result<Json<Vec<Comment>>, AppError> {
    let service = CommentService::new(state.db.clone());
    let comments = service.list().await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list comments");
        AppError::internal("failed to list comments")
    })?;

    Ok(Json(comments))
}

pub async fn get_comment(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Comment>, AppError> {
    let service = CommentService::new(state.db.clone());
    let comment = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, comment_id = id, "failed to fetch comment");
        AppError::internal("failed to fetch comment")
    })?;

    match comment {
        Some(comment) => Ok(Json(comment)),
        None => Err(AppError::not_found("comment not found")),
    }
}

// `author`, `created_at` and `updated_at` are server-controlled;
// deny_unknown_fields turns any attempt to set them into a 400.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub text: Option<String>,
    pub likes: Option<i64>,
    pub image: Option<String>,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let text = payload
        .text
        .ok_or_else(|| AppError::validation("text is required", &["text"]))?;
    validate_text(&text)?;

    let likes = payload.likes.unwrap_or(0);
    validate_likes(likes)?;

    let image = validate_image(payload.image)?;

    let author = resolve_default_author(&state).await?;

    let service = CommentService::new(state.db.clone());
    let comment = service
        .create(&author, text, likes, image)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to create comment");
            AppError::internal("failed to create comment")
        })?;

    Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCommentRequest {
    pub text: Option<String>,
    pub likes: Option<i64>,
    pub image: Option<String>,
}

/// PUT: full replacement, `text` is required.
pub async fn replace_comment(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    if payload.text.is_none() {
        return Err(AppError::validation("text is required", &["text"]));
    }
    apply_update(&state, id, payload).await
}

/// PATCH: any subset of the writable fields.
pub async fn patch_comment(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<Comment>, AppError> {
    apply_update(&state, id, payload).await
}

async fn apply_update(
    state: &AppState,
    id: i64,
    payload: UpdateCommentRequest,
) -> Result<Json<Comment>, AppError> {
    if let Some(text) = payload.text.as_deref() {
        validate_text(text)?;
    }
    if let Some(likes) = payload.likes {
        validate_likes(likes)?;
    }

    // Outer None leaves the image untouched; an empty string clears it.
    let image = match payload.image {
        None => None,
        Some(image) => Some(validate_image(Some(image))?),
    };

    let service = CommentService::new(state.db.clone());
    let comment = service
        .update(id, payload.text, payload.likes, image)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, comment_id = id, "failed to update comment");
            AppError::internal("failed to update comment")
        })?;

    match comment {
        Some(comment) => Ok(Json(comment)),
        None => Err(AppError::not_found("comment not found")),
    }
}

pub async fn delete_comment(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let service = CommentService::new(state.db.clone());
    let deleted = service.delete(id).await.map_err(|err| {
        tracing::error!(error = ?err, comment_id = id, "failed to delete comment");
        AppError::internal("failed to delete comment")
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("comment not found"))
    }
}

/// Look up the account new comments are attributed to. Its absence is an
/// operator mistake (the seeder provisions it), so it surfaces as a 500
/// rather than a client error.
async fn resolve_default_author(state: &AppState) -> Result<User, AppError> {
    let users = UserService::new(state.db.clone());
    let user = users
        .find_by_username(&state.default_author)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to resolve default author");
            AppError::internal("failed to resolve default author")
        })?;

    user.ok_or_else(|| {
        tracing::error!(
            username = %state.default_author,
            "default author account is missing; run the seed importer to provision it"
        );
        AppError::internal("default author account is not provisioned")
    })
}

fn validate_text(text: &str) -> Result<(), AppError> {
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::validation(
            format!("text must be at most {} characters", MAX_TEXT_LEN),
            &["text"],
        ));
    }
    Ok(())
}

fn validate_likes(likes: i64) -> Result<(), AppError> {
    if likes < 0 {
        return Err(AppError::validation("likes must be non-negative", &["likes"]));
    }
    Ok(())
}

fn validate_image(image: Option<String>) -> Result<Option<String>, AppError> {
    match image {
        None => Ok(None),
        Some(image) if image.is_empty() => Ok(None),
        Some(image) => {
            Url::parse(&image)
                .map_err(|_| AppError::validation("image must be a valid URL", &["image"]))?;
            Ok(Some(image))
        }
    }
}
