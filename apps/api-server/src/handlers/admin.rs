//! Administrative endpoints.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use publica_shared::ApiResponse;
use publica_shared::dto::DeletedResponse;

use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// DELETE /api/admin/posts/{id} - remove any post.
///
/// The admin scope gates on role at the edge; the delete itself goes
/// through the same service (and so the same policy) as the regular route.
pub async fn delete_post(
    state: web::Data<AppState>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = state
        .post_service
        .delete_post(&admin.0.principal(), path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        DeletedResponse { id: id.to_string() },
        "Post deleted",
    )))
}
