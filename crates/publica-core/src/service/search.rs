//! Combined user and post search.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::UserSummary;
use crate::error::DomainError;
use crate::ports::{PostRepository, UserRepository};
use crate::service::view::{self, PostView};

/// Restricts a search to one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Users,
    Posts,
}

impl SearchScope {
    /// Parse the `type` query parameter. Unknown values behave like an
    /// omitted filter.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "users" => Some(SearchScope::Users),
            "posts" => Some(SearchScope::Posts),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub users: Vec<UserSummary>,
    pub posts: Vec<PostView>,
}

/// Full-text lookup across users and posts by a single query string.
pub struct SearchService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl SearchService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    pub async fn search_all(
        &self,
        query: &str,
        scope: Option<SearchScope>,
    ) -> Result<SearchResults, DomainError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DomainError::Validation(
                "search query is required".to_string(),
            ));
        }

        let users = match scope {
            None | Some(SearchScope::Users) => self.users.search(query).await?,
            Some(SearchScope::Posts) => Vec::new(),
        };

        let posts = match scope {
            None | Some(SearchScope::Posts) => {
                let found = self.posts.search(query).await?;
                view::expand_posts(self.users.as_ref(), found).await?
            }
            Some(SearchScope::Users) => Vec::new(),
        };

        Ok(SearchResults { users, posts })
    }
}
