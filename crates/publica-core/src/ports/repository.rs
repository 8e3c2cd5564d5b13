use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, User, UserSummary};
use crate::error::RepoError;

/// User repository.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Save a user (create or update).
    async fn save(&self, user: User) -> Result<User, RepoError>;

    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Batch-resolve user references to profile summaries.
    ///
    /// Ids with no matching user are simply absent from the map; callers
    /// decide how to treat dangling references.
    async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, RepoError>;

    /// Free-text match over username and first/last name.
    async fn search(&self, query: &str) -> Result<Vec<UserSummary>, RepoError>;
}

/// Post repository.
///
/// Mutations of the embedded `likes` and `comments` arrays and of the pin
/// state are single-document atomic: implementations must not lose
/// concurrent updates through a read-then-save cycle.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Delete irrecoverably. `Err(RepoError::NotFound)` if absent.
    async fn delete(&self, id: Uuid) -> Result<(), RepoError>;

    /// Every post, most recent first.
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError>;

    /// One feed page ordered by `pinned` desc then `created_at` desc,
    /// together with the unfiltered total post count.
    async fn page(&self, page: u64, limit: u64) -> Result<(Vec<Post>, u64), RepoError>;

    /// Replace the content verbatim. Enforces the store-layer length
    /// constraint; returns `Ok(None)` if the post is gone.
    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Post>, RepoError>;

    /// Atomically add the user to the like set, or remove it if present.
    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Atomically append a comment.
    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<Option<Post>, RepoError>;

    async fn set_comments_disabled(
        &self,
        id: Uuid,
        disabled: bool,
    ) -> Result<Option<Post>, RepoError>;

    /// Atomically set or clear the pin state. `pinned_by` and `pinned_at`
    /// are written together with the flag, never separately.
    async fn set_pin(
        &self,
        id: Uuid,
        pin: Option<(Uuid, chrono::DateTime<chrono::Utc>)>,
    ) -> Result<Option<Post>, RepoError>;

    /// Free-text match over post content.
    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError>;
}
