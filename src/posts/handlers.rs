use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractor::CurrentUser,
    error::ApiError,
    response::ApiSuccess,
    state::AppState,
};

use super::{
    dto::{CreatePostRequest, EditPostRequest, PostQuery},
    repo,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).patch(edit_post))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn list_posts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = repo::list(&state.db, query.keyword.as_deref(), query.newest_first()).await?;
    Ok(ApiSuccess::new(posts))
}

#[instrument(skip_all, fields(user_id = %user.id, post_id = %id))]
async fn get_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = repo::find_with_author(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;
    Ok(ApiSuccess::new(post))
}

#[instrument(skip_all, fields(user_id = %user.id))]
async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = repo::create(
        &state.db,
        user.id,
        &payload.content,
        payload.photo.as_deref(),
    )
    .await?;
    Ok(ApiSuccess::created(post))
}

#[instrument(skip_all, fields(user_id = %user.id, post_id = %id))]
async fn edit_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditPostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.content.is_empty() {
        return Err(ApiError::validation("content", "content cannot be empty"));
    }

    let post = repo::find_with_author(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;
    if post.user_id != user.id {
        return Err(ApiError::Forbidden("only the author may edit this post".into()));
    }

    let edited = repo::update_content(&state.db, id, &payload.content)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;
    Ok(ApiSuccess::new(edited))
}
