//! Read-only feed and post queries.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository};
use crate::service::view::{self, PostView};

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
const MAX_PAGE_LIMIT: u64 = 100;

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct FeedPage {
    pub data: Vec<PostView>,
    pub pagination: Pagination,
}

/// Paginated, pin-prioritized feed plus the unpaginated listings.
pub struct FeedQuery {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl FeedQuery {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// One page of the global feed: pinned posts first, then newest first.
    ///
    /// Posts whose author account was deleted are dropped from the page
    /// after slicing, and `total` counts them anyway. A page can therefore
    /// come back short while `total_pages` still advertises more; that is
    /// the observable contract of the system being reproduced.
    pub async fn user_feed(&self, page: u64, limit: u64) -> Result<FeedPage, DomainError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);

        let (posts, total) = self.posts.page(page, limit).await?;
        let views = view::expand_posts(self.users.as_ref(), posts).await?;
        let data: Vec<PostView> = views.into_iter().filter(|v| v.author.is_some()).collect();

        Ok(FeedPage {
            data,
            pagination: Pagination {
                total,
                page,
                limit,
                total_pages: total.div_ceil(limit),
            },
        })
    }

    /// Every post, newest first, without pagination or author filtering.
    pub async fn list_posts(&self) -> Result<Vec<PostView>, DomainError> {
        let posts = self.posts.list_recent().await?;
        Ok(view::expand_posts(self.users.as_ref(), posts).await?)
    }

    /// A single post with full comment expansion.
    pub async fn post_by_id(&self, id: Uuid) -> Result<PostView, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(id))?;
        Ok(view::expand_post(self.users.as_ref(), post).await?)
    }
}
