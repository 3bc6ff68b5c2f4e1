use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::auth::repo::{Role, User};
use crate::error::ApiError;
use crate::posts::dto::{
    total_pages, CreatePostRequest, DeletedResponse, ListPostsQuery, PaginationMeta, PostsPage,
    UpdatePostRequest,
};
use crate::posts::repo::Post;
use crate::posts::slug::slugify;
use crate::state::AppState;
use crate::validation::{require_fields, sanitize_input};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:id", get(get_post))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id", put(update_post).delete(delete_post))
}

// Ownership rules. Update has no admin override; delete does. The
// asymmetry is deliberate and asserted by tests below.

fn owns_post(post: &Post, user: &User) -> bool {
    post.author == user.id
}

fn may_delete(post: &Post, user: &User) -> bool {
    owns_post(post, user) || user.role == Role::Admin
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    let len = title.chars().count();
    if len < 3 {
        return Err(ApiError::Validation(
            "Title must be at least 3 characters".into(),
        ));
    }
    if len > 200 {
        return Err(ApiError::Validation(
            "Title cannot exceed 200 characters".into(),
        ));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), ApiError> {
    if content.chars().count() < 10 {
        return Err(ApiError::Validation(
            "Content must be at least 10 characters".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<PostsPage>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).max(1);
    let offset = (page - 1) * limit;

    let category = query.category.as_deref();
    let posts = Post::list(&state.db, category, query.published, limit, offset).await?;
    let total = Post::count(&state.db, category, query.published).await?;

    Ok(Json(PostsPage {
        posts,
        pagination: PaginationMeta {
            page,
            limit,
            total,
            pages: total_pages(total, limit),
        },
    }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, ApiError> {
    // The view counter bumps on every successful read, atomically.
    let post = Post::fetch_and_count_view(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;
    Ok(Json(post))
}

#[instrument(skip(state, user, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    require_fields(&[("title", &payload.title), ("content", &payload.content)])?;

    let title = sanitize_input(&payload.title);
    let content = sanitize_input(&payload.content);
    validate_title(&title)?;
    validate_content(&content)?;

    let slug = slugify(&title);
    let post = Post::create(
        &state.db,
        &title,
        &content,
        user.id,
        payload.category.as_deref(),
        &slug,
    )
    .await?;

    info!(post_id = %post.id, author = %user.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

#[instrument(skip(state, user, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let mut post = Post::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    if !owns_post(&post, &user) {
        return Err(ApiError::Forbidden(
            "You can only update your own posts".into(),
        ));
    }

    if let Some(title) = payload.title {
        let title = sanitize_input(&title);
        validate_title(&title)?;
        post.title = title;
    }
    if let Some(content) = payload.content {
        let content = sanitize_input(&content);
        validate_content(&content)?;
        post.content = content;
    }
    if let Some(category) = payload.category {
        post.category = Some(category);
    }
    if let Some(published) = payload.published {
        post.published = published;
    }

    let post = post.save(&state.db).await?;

    info!(post_id = %post.id, "post updated");
    Ok(Json(post))
}

#[instrument(skip(state, user))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let post = Post::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    if !may_delete(&post, &user) {
        return Err(ApiError::Forbidden(
            "You can only delete your own posts".into(),
        ));
    }

    Post::delete(&state.db, id).await?;

    info!(post_id = %id, deleted_by = %user.id, "post deleted");
    Ok(Json(DeletedResponse {
        message: "Post deleted successfully".into(),
    }))
}
