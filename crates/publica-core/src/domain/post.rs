use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum post content length, enforced at the store layer.
pub const MAX_CONTENT_LEN: usize = 2000;

/// Structured mood tag attached to a post at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mood {
    pub emoji: String,
    pub label: String,
}

/// Comment embedded in a post.
///
/// Constructed only through [`Comment::new`]; comments are append-only and
/// never individually edited or deleted in this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub author: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            text,
            created_at: Utc::now(),
        }
    }
}

/// Post entity - a feed entry authored by a user, optionally written on
/// another user's wall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Immutable after creation.
    pub author: Uuid,
    pub content: String,
    pub image: Option<String>,
    pub mood: Option<Mood>,
    pub target_user: Option<Uuid>,
    /// Set semantics: no duplicate user ids, order irrelevant.
    pub likes: Vec<Uuid>,
    /// Insertion order is display order.
    pub comments: Vec<Comment>,
    pub comments_disabled: bool,
    pub pinned: bool,
    pub pinned_by: Option<Uuid>,
    pub pinned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post with generated ID and timestamps.
    pub fn new(
        author: Uuid,
        content: String,
        image: Option<String>,
        mood: Option<Mood>,
        target_user: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author,
            content,
            image,
            mood,
            target_user,
            likes: Vec::new(),
            comments: Vec::new(),
            comments_disabled: false,
            pinned: false,
            pinned_by: None,
            pinned_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn liked_by(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_post_starts_clean() {
        let author = Uuid::new_v4();
        let post = Post::new(author, "hola".to_string(), None, None, None);

        assert_eq!(post.author, author);
        assert!(post.likes.is_empty());
        assert!(post.comments.is_empty());
        assert!(!post.comments_disabled);
        assert!(!post.pinned);
        assert!(post.pinned_by.is_none());
        assert!(post.pinned_at.is_none());
    }
}
