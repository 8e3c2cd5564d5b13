//! Post mutations: create, edit, delete, like, comment, pin, comment-lock.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{Comment, Mood, Post, Principal};
use crate::error::DomainError;
use crate::policy;
use crate::ports::{PostRepository, UserRepository};
use crate::service::view::{self, PostView};

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub content: String,
    pub image: Option<String>,
    pub mood: Option<Mood>,
    pub target_user: Option<Uuid>,
}

/// Business rules for all post mutations.
///
/// Every operation takes the authenticated [`Principal`] explicitly;
/// permission decisions are delegated to the [`policy`] module.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Create a post, optionally on another user's wall.
    pub async fn create_post(
        &self,
        principal: &Principal,
        input: NewPost,
    ) -> Result<PostView, DomainError> {
        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(DomainError::Validation("content is required".to_string()));
        }

        if let Some(target) = input.target_user {
            if self.users.find_by_id(target).await?.is_none() {
                return Err(DomainError::user_not_found(target));
            }
        }

        let post = Post::new(
            principal.id,
            content,
            input.image,
            input.mood,
            input.target_user,
        );
        let saved = self.posts.insert(post).await?;
        Ok(view::expand_post(self.users.as_ref(), saved).await?)
    }

    /// Replace the content of the caller's own post.
    pub async fn update_post(
        &self,
        principal: &Principal,
        post_id: Uuid,
        content: String,
    ) -> Result<PostView, DomainError> {
        let post = self.find(post_id).await?;
        if !policy::can_edit_post(principal, &post) {
            return Err(DomainError::Forbidden("only the author can edit a post"));
        }

        let updated = self
            .posts
            .update_content(post_id, content)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        Ok(view::expand_post(self.users.as_ref(), updated).await?)
    }

    /// Delete a post irrecoverably. Allowed for the author and for admins.
    pub async fn delete_post(
        &self,
        principal: &Principal,
        post_id: Uuid,
    ) -> Result<Uuid, DomainError> {
        let post = self.find(post_id).await?;
        if !policy::can_delete_post(principal, &post) {
            return Err(DomainError::Forbidden(
                "only the author or an admin can delete a post",
            ));
        }

        match self.posts.delete(post_id).await {
            Ok(()) => Ok(post_id),
            Err(crate::error::RepoError::NotFound) => Err(DomainError::post_not_found(post_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Toggle the caller's membership in the like set.
    pub async fn toggle_like(
        &self,
        principal: &Principal,
        post_id: Uuid,
    ) -> Result<PostView, DomainError> {
        let updated = self
            .posts
            .toggle_like(post_id, principal.id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        Ok(view::expand_post(self.users.as_ref(), updated).await?)
    }

    /// Append a comment, unless comments are locked on the post.
    pub async fn add_comment(
        &self,
        principal: &Principal,
        post_id: Uuid,
        text: String,
    ) -> Result<PostView, DomainError> {
        let post = self.find(post_id).await?;
        if post.comments_disabled {
            return Err(DomainError::Forbidden("comments are disabled on this post"));
        }

        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(DomainError::Validation(
                "comment text is required".to_string(),
            ));
        }

        let updated = self
            .posts
            .push_comment(post_id, Comment::new(principal.id, text))
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        Ok(view::expand_post(self.users.as_ref(), updated).await?)
    }

    /// Flip the comment lock.
    pub async fn toggle_comments(
        &self,
        principal: &Principal,
        post_id: Uuid,
    ) -> Result<PostView, DomainError> {
        let post = self.find(post_id).await?;
        if !policy::can_toggle_comments(principal, &post) {
            return Err(DomainError::Forbidden(
                "only staff or the author can toggle comments",
            ));
        }

        let updated = self
            .posts
            .set_comments_disabled(post_id, !post.comments_disabled)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        Ok(view::expand_post(self.users.as_ref(), updated).await?)
    }

    /// Flip the pin state. `pinned_by`/`pinned_at` are set and cleared
    /// together with the flag.
    pub async fn toggle_pin(
        &self,
        principal: &Principal,
        post_id: Uuid,
    ) -> Result<PostView, DomainError> {
        let post = self.find(post_id).await?;
        if !policy::can_toggle_pin(principal) {
            return Err(DomainError::Forbidden(
                "only admins and moderators can pin posts",
            ));
        }

        let pin = if post.pinned {
            None
        } else {
            Some((principal.id, Utc::now()))
        };
        let updated = self
            .posts
            .set_pin(post_id, pin)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))?;
        Ok(view::expand_post(self.users.as_ref(), updated).await?)
    }

    async fn find(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::post_not_found(post_id))
    }
}
