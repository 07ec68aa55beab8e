use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    activity::{self, repo::Action},
    auth::jwt::{AuthUser, MaybeAuthUser},
    blogs::{
        dto::{
            total_pages, BlogListQuery, BlogListResponse, CreateBlogRequest, UpdateBlogRequest,
        },
        repo::{self, Blog},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/blogs/create", post(create_blog))
        .route("/blogs", get(list_blogs))
        .route("/blogs/:id", get(get_blog))
        .route("/blogs/:id", put(update_blog))
        .route("/blogs/:id", delete(delete_blog))
}

#[instrument(skip(state, payload))]
pub async fn create_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateBlogRequest>,
) -> ApiResult<(StatusCode, Json<Blog>)> {
    payload.validate().map_err(ApiError::Validation)?;

    let blog = repo::insert(
        &state.db,
        user_id,
        &payload.title,
        &payload.content,
        payload.category.as_deref(),
    )
    .await?;

    // The blog write is not rolled back if the audit insert fails; the caller
    // sees a 500 but the blog exists (accepted inconsistency window).
    activity::repo::record(&state.db, user_id, Action::Created, blog.id).await?;

    info!(blog_id = %blog.id, user_id = %user_id, "blog created");
    Ok((StatusCode::CREATED, Json(blog)))
}

#[instrument(skip(state))]
pub async fn list_blogs(
    State(state): State<AppState>,
    Query(query): Query<BlogListQuery>,
) -> ApiResult<Json<BlogListResponse>> {
    let query = query.normalized();

    let total_blogs = repo::count(&state.db, &query).await?;
    let rows = repo::list(&state.db, &query).await?;

    Ok(Json(BlogListResponse {
        total_blogs,
        current_page: query.page,
        total_pages: total_pages(total_blogs, query.limit),
        blogs: rows.into_iter().map(Into::into).collect(),
    }))
}

#[instrument(skip(state))]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Blog>> {
    let blog = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;
    Ok(Json(blog))
}

#[instrument(skip(state, payload))]
pub async fn update_blog(
    State(state): State<AppState>,
    MaybeAuthUser(user_id): MaybeAuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlogRequest>,
) -> ApiResult<Json<Blog>> {
    payload.validate().map_err(ApiError::Validation)?;

    // Ownership on update is a policy switch: the original platform never
    // checked it (only delete did), so the default leaves it open.
    if state.config.enforce_update_author {
        let user_id =
            user_id.ok_or_else(|| ApiError::Unauthenticated("Missing or invalid token".into()))?;
        let blog = repo::find_by_id(&state.db, id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;
        if blog.author_id != user_id {
            return Err(ApiError::Forbidden("Not authorized to update this blog".into()));
        }
    }

    let blog = repo::update(
        &state.db,
        id,
        payload.title.as_deref(),
        payload.content.as_deref(),
        payload.category.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;

    info!(blog_id = %blog.id, "blog updated");
    Ok(Json(blog))
}

#[instrument(skip(state))]
pub async fn delete_blog(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let blog = repo::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Blog not found".into()))?;

    if blog.author_id != user_id {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this blog".into(),
        ));
    }

    repo::delete(&state.db, id).await?;
    activity::repo::record(&state.db, user_id, Action::Deleted, id).await?;

    info!(blog_id = %id, user_id = %user_id, "blog deleted");
    Ok(Json(serde_json::json!({
        "message": "Blog deleted successfully"
    })))
}
