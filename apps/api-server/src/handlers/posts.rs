//! Post endpoints: listing, feed, and all mutations.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use publica_core::domain::Mood;
use publica_core::service::{DEFAULT_PAGE_LIMIT, NewPost};
use publica_shared::ApiResponse;
use publica_shared::dto::{CommentRequest, CreatePostRequest, DeletedResponse, FeedParams,
    UpdatePostRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts - public listing of every post, newest first.
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.feed.list_posts().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(posts)))
}

/// GET /api/posts/{id} - public, full comment expansion.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.feed.post_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = NewPost {
        content: req.content,
        image: req.image,
        mood: req.mood.map(|m| Mood {
            emoji: m.emoji,
            label: m.label,
        }),
        target_user: req.target_user_id,
    };

    let post = state
        .post_service
        .create_post(&identity.principal(), input)
        .await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(post)))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .post_service
        .update_post(&identity.principal(), path.into_inner(), body.into_inner().content)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = state
        .post_service
        .delete_post(&identity.principal(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        DeletedResponse { id: id.to_string() },
        "Post deleted",
    )))
}

/// POST /api/posts/{id}/like
pub async fn toggle_like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .post_service
        .toggle_like(&identity.principal(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// POST /api/posts/{id}/comment
pub async fn add_comment(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .post_service
        .add_comment(&identity.principal(), path.into_inner(), body.into_inner().text)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// GET /api/posts/feed/me?page=&limit=
pub async fn my_feed(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<FeedParams>,
) -> AppResult<HttpResponse> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT);

    let feed = state.feed.user_feed(page, limit).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(feed)))
}

/// PATCH /api/posts/{id}/toggle-comments
pub async fn toggle_comments(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .post_service
        .toggle_comments(&identity.principal(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}

/// PATCH /api/posts/{id}/toggle-pin
pub async fn toggle_pin(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .post_service
        .toggle_pin(&identity.principal(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post)))
}
