//! Read-side projections of posts with user references expanded.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Mood, Post, UserSummary};
use crate::error::RepoError;
use crate::ports::UserRepository;

/// Comment with its author expanded to a profile summary.
///
/// `author` is `None` when the referenced account no longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub id: Uuid,
    pub author: Option<UserSummary>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Post with `author`, `target_user`, `pinned_by`, and comment authors
/// expanded to profile summaries.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: Uuid,
    pub author: Option<UserSummary>,
    pub content: String,
    pub image: Option<String>,
    pub mood: Option<Mood>,
    pub target_user: Option<UserSummary>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<CommentView>,
    pub comments_disabled: bool,
    pub pinned: bool,
    pub pinned_by: Option<UserSummary>,
    pub pinned_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    fn build(post: Post, users: &HashMap<Uuid, UserSummary>) -> Self {
        let comments = post
            .comments
            .into_iter()
            .map(|c| CommentView {
                id: c.id,
                author: users.get(&c.author).cloned(),
                text: c.text,
                created_at: c.created_at,
            })
            .collect();

        Self {
            id: post.id,
            author: users.get(&post.author).cloned(),
            content: post.content,
            image: post.image,
            mood: post.mood,
            target_user: post.target_user.and_then(|id| users.get(&id).cloned()),
            likes: post.likes,
            comments,
            comments_disabled: post.comments_disabled,
            pinned: post.pinned,
            pinned_by: post.pinned_by.and_then(|id| users.get(&id).cloned()),
            pinned_at: post.pinned_at,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Expand a batch of posts with a single user lookup.
pub(crate) async fn expand_posts(
    users: &dyn UserRepository,
    posts: Vec<Post>,
) -> Result<Vec<PostView>, RepoError> {
    let mut ids: Vec<Uuid> = Vec::new();
    for post in &posts {
        ids.push(post.author);
        ids.extend(post.target_user);
        ids.extend(post.pinned_by);
        ids.extend(post.comments.iter().map(|c| c.author));
    }
    ids.sort_unstable();
    ids.dedup();

    let summaries = users.summaries(&ids).await?;
    Ok(posts
        .into_iter()
        .map(|p| PostView::build(p, &summaries))
        .collect())
}

pub(crate) async fn expand_post(
    users: &dyn UserRepository,
    post: Post,
) -> Result<PostView, RepoError> {
    let mut views = expand_posts(users, vec![post]).await?;
    Ok(views.remove(0))
}
