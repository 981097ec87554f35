//! Post management controller.

use crate::{
    extractors::ValidatedJson,
    responses::{created, ok, ApiResult, AppError},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chronicle_core::{ChronicleError, PostId};
use chronicle_service::{CreatePostRequest, DeleteConfirmation, PostResponse, UpdatePostRequest};
use tracing::{debug, error};

/// Creates the post router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/:id", get(get_post).put(update_post).delete(delete_post))
}

/// List all posts.
async fn list_posts(State(state): State<AppState>) -> ApiResult<Vec<PostResponse>> {
    debug!("List posts request");

    let response = state.post_service.list_posts().await?;
    ok(response)
}

/// Create a new post.
async fn create_post(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), AppError> {
    debug!("Create post request: {}", request.title);

    let response = state
        .post_service
        .create_post(request)
        .await
        .map_err(map_create_error)?;
    Ok(created(response))
}

/// Get a post by ID.
async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PostResponse> {
    debug!("Get post request: {}", id);

    let post_id = parse_post_id(&id)?;
    let response = state.post_service.get_post(post_id).await?;
    ok(response)
}

/// Update a post.
async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdatePostRequest>,
) -> ApiResult<PostResponse> {
    debug!("Update post request: {}", id);

    let post_id = parse_post_id(&id)?;
    let response = state.post_service.update_post(post_id, request).await?;
    ok(response)
}

/// Delete a post.
///
/// Returns a confirmation message rather than the removed entity.
async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteConfirmation> {
    debug!("Delete post request: {}", id);

    let post_id = parse_post_id(&id)?;
    state.post_service.delete_post(post_id).await?;
    ok(DeleteConfirmation::post_deleted())
}

/// Maps create failures onto the create endpoint's error contract.
///
/// The create endpoint reports every failure as 400, whether the request
/// was invalid or the store rejected the write. Validation detail passes
/// through; store failures are logged and reported with a generic message.
fn map_create_error(err: ChronicleError) -> AppError {
    match err {
        err @ ChronicleError::Validation(_) => AppError(err),
        other => {
            error!("Create post failed: {}", other);
            AppError(ChronicleError::validation("Error creating post"))
        }
    }
}

/// Helper to parse post ID from path parameter.
fn parse_post_id(id: &str) -> Result<PostId, AppError> {
    PostId::parse(id)
        .map_err(|_| AppError(ChronicleError::Validation(format!("Invalid post ID: {}", id))))
}
