//! Combined search endpoint.

use actix_web::{HttpResponse, web};

use publica_core::service::SearchScope;
use publica_shared::ApiResponse;
use publica_shared::dto::SearchParams;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/search?q=<term>&type=users|posts
pub async fn search_all(
    state: web::Data<AppState>,
    query: web::Query<SearchParams>,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let scope = params.kind.as_deref().and_then(SearchScope::parse);

    let results = state.search.search_all(&params.q, scope).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(results)))
}
