//! In-memory repositories - used for tests and for running without a
//! configured database.
//!
//! Each mutation takes the write lock once, so the array updates the port
//! declares atomic really are atomic here. Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use publica_core::domain::{Comment, MAX_CONTENT_LEN, Post, User, UserSummary};
use publica_core::error::RepoError;
use publica_core::ports::{PostRepository, UserRepository};

/// In-memory user repository backed by a HashMap with async RwLock.
pub struct MemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;
        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }

    async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, RepoError> {
        let store = self.store.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| store.get(id).map(|u| (*id, u.summary())))
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<UserSummary>, RepoError> {
        let needle = query.to_lowercase();
        let store = self.store.read().await;
        Ok(store
            .values()
            .filter(|u| {
                u.username.to_lowercase().contains(&needle)
                    || u.first_name.to_lowercase().contains(&needle)
                    || u.last_name.to_lowercase().contains(&needle)
            })
            .map(|u| u.summary())
            .collect())
    }
}

/// In-memory post repository backed by a HashMap with async RwLock.
pub struct MemoryPostRepository {
    store: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    fn check_content_len(content: &str) -> Result<(), RepoError> {
        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(RepoError::Constraint(format!(
                "content exceeds {MAX_CONTENT_LEN} characters"
            )));
        }
        Ok(())
    }
}

impl Default for MemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for MemoryPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        Self::check_content_len(&post.content)?;
        let mut store = self.store.write().await;
        store.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        store.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }

    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn page(&self, page: u64, limit: u64) -> Result<(Vec<Post>, u64), RepoError> {
        let store = self.store.read().await;
        let total = store.len() as u64;

        let mut posts: Vec<Post> = store.values().cloned().collect();
        posts.sort_by(|a, b| {
            b.pinned
                .cmp(&a.pinned)
                .then(b.created_at.cmp(&a.created_at))
        });

        let skip = page.saturating_sub(1).saturating_mul(limit);
        let slice = posts
            .into_iter()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(limit as usize)
            .collect();
        Ok((slice, total))
    }

    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Post>, RepoError> {
        Self::check_content_len(&content)?;
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|post| {
            post.content = content;
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|post| {
            if let Some(pos) = post.likes.iter().position(|&u| u == user_id) {
                post.likes.swap_remove(pos);
            } else {
                post.likes.push(user_id);
            }
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|post| {
            post.comments.push(comment);
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn set_comments_disabled(
        &self,
        id: Uuid,
        disabled: bool,
    ) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|post| {
            post.comments_disabled = disabled;
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn set_pin(
        &self,
        id: Uuid,
        pin: Option<(Uuid, DateTime<Utc>)>,
    ) -> Result<Option<Post>, RepoError> {
        let mut store = self.store.write().await;
        Ok(store.get_mut(&id).map(|post| {
            match pin {
                Some((by, at)) => {
                    post.pinned = true;
                    post.pinned_by = Some(by);
                    post.pinned_at = Some(at);
                }
                None => {
                    post.pinned = false;
                    post.pinned_by = None;
                    post.pinned_at = None;
                }
            }
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let needle = query.to_lowercase();
        let store = self.store.read().await;
        let mut posts: Vec<Post> = store
            .values()
            .filter(|p| p.content.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}
