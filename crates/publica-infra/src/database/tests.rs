//! Behavior tests for the post services, run against the in-memory
//! repositories, plus MockDatabase tests for the Postgres query layer.

use std::sync::Arc;

use uuid::Uuid;

use publica_core::domain::{Principal, Role, User};
use publica_core::error::DomainError;
use publica_core::ports::{PostRepository, UserRepository};
use publica_core::service::{FeedQuery, NewPost, PostService, SearchScope, SearchService};

use super::memory::{MemoryPostRepository, MemoryUserRepository};

struct Fixture {
    users: Arc<MemoryUserRepository>,
    posts: Arc<MemoryPostRepository>,
    service: PostService,
    feed: FeedQuery,
    search: SearchService,
}

impl Fixture {
    fn new() -> Self {
        let users = Arc::new(MemoryUserRepository::new());
        let posts = Arc::new(MemoryPostRepository::new());
        let service = PostService::new(posts.clone(), users.clone());
        let feed = FeedQuery::new(posts.clone(), users.clone());
        let search = SearchService::new(posts.clone(), users.clone());
        Self {
            users,
            posts,
            service,
            feed,
            search,
        }
    }

    async fn user(&self, username: &str) -> Principal {
        self.member(username, Role::User).await
    }

    async fn member(&self, username: &str, role: Role) -> Principal {
        let mut user = User::new(
            username.to_string(),
            format!("{username}@lapublica.cat"),
            "hash".to_string(),
            username.to_string(),
            "Serra".to_string(),
        );
        user.role = role;
        let saved = self.users.save(user).await.unwrap();
        Principal::new(saved.id, role)
    }
}

fn text_post(content: &str) -> NewPost {
    NewPost {
        content: content.to_string(),
        image: None,
        mood: None,
        target_user: None,
    }
}

#[tokio::test]
async fn create_post_rejects_empty_content() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;

    let result = fx.service.create_post(&author, text_post("   ")).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn created_post_is_retrievable_by_id() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();
    let fetched = fx.feed.post_by_id(created.id).await.unwrap();

    assert_eq!(fetched.content, "hello");
    assert!(fetched.likes.is_empty());
    assert!(fetched.comments.is_empty());
    assert_eq!(fetched.author.unwrap().username, "anna");
}

#[tokio::test]
async fn create_post_on_missing_wall_fails() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;

    let mut input = text_post("per tu");
    input.target_user = Some(Uuid::new_v4());

    let result = fx.service.create_post(&author, input).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn create_post_expands_target_user() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let wall_owner = fx.user("bernat").await;

    let mut input = text_post("per tu");
    input.target_user = Some(wall_owner.id);

    let created = fx.service.create_post(&author, input).await.unwrap();

    assert_eq!(created.target_user.unwrap().username, "bernat");
}

#[tokio::test]
async fn like_toggles_back_to_original_state() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let fan = fx.user("bernat").await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();

    let liked = fx.service.toggle_like(&fan, created.id).await.unwrap();
    assert_eq!(liked.likes, vec![fan.id]);

    let unliked = fx.service.toggle_like(&fan, created.id).await.unwrap();
    assert!(unliked.likes.is_empty());
}

#[tokio::test]
async fn update_post_is_author_only() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let admin = fx.member("admin", Role::Admin).await;

    let created = fx.service.create_post(&author, text_post("v1")).await.unwrap();

    let denied = fx
        .service
        .update_post(&admin, created.id, "v2".to_string())
        .await;
    assert!(matches!(denied, Err(DomainError::Forbidden(_))));

    let updated = fx
        .service
        .update_post(&author, created.id, "v2".to_string())
        .await
        .unwrap();
    assert_eq!(updated.content, "v2");
}

#[tokio::test]
async fn comment_on_locked_post_fails_and_changes_nothing() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let commenter = fx.user("bernat").await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();
    fx.service.toggle_comments(&author, created.id).await.unwrap();

    let result = fx
        .service
        .add_comment(&commenter, created.id, "hi".to_string())
        .await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
    let post = fx.feed.post_by_id(created.id).await.unwrap();
    assert!(post.comments.is_empty());
}

#[tokio::test]
async fn comment_requires_text() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();
    let result = fx
        .service
        .add_comment(&author, created.id, "  ".to_string())
        .await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn comments_append_in_order_with_expanded_authors() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let commenter = fx.user("bernat").await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();
    fx.service
        .add_comment(&commenter, created.id, "first".to_string())
        .await
        .unwrap();
    let post = fx
        .service
        .add_comment(&author, created.id, "second".to_string())
        .await
        .unwrap();

    assert_eq!(post.comments.len(), 2);
    assert_eq!(post.comments[0].text, "first");
    assert_eq!(post.comments[0].author.as_ref().unwrap().username, "bernat");
    assert_eq!(post.comments[1].text, "second");
}

#[tokio::test]
async fn toggle_comments_denied_for_unrelated_user() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let stranger = fx.user("bernat").await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();
    let result = fx.service.toggle_comments(&stranger, created.id).await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
}

#[tokio::test]
async fn pin_is_denied_for_regular_users_even_the_author() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();
    let result = fx.service.toggle_pin(&author, created.id).await;

    assert!(matches!(result, Err(DomainError::Forbidden(_))));
}

#[tokio::test]
async fn pin_sets_and_clears_all_pin_fields_together() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let moderator = fx.member("mod", Role::Moderator).await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();

    let pinned = fx.service.toggle_pin(&moderator, created.id).await.unwrap();
    assert!(pinned.pinned);
    assert_eq!(pinned.pinned_by.unwrap().username, "mod");
    assert!(pinned.pinned_at.is_some());

    let unpinned = fx.service.toggle_pin(&moderator, created.id).await.unwrap();
    assert!(!unpinned.pinned);
    assert!(unpinned.pinned_by.is_none());
    assert!(unpinned.pinned_at.is_none());
}

#[tokio::test]
async fn delete_is_denied_for_strangers_and_allowed_for_admins() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let stranger = fx.user("bernat").await;
    let admin = fx.member("admin", Role::Admin).await;

    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();

    let denied = fx.service.delete_post(&stranger, created.id).await;
    assert!(matches!(denied, Err(DomainError::Forbidden(_))));
    assert!(fx.feed.post_by_id(created.id).await.is_ok());

    let deleted = fx.service.delete_post(&admin, created.id).await.unwrap();
    assert_eq!(deleted, created.id);
    assert!(matches!(
        fx.feed.post_by_id(created.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn feed_pages_are_bounded_and_disjoint() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;

    for i in 0..15 {
        fx.service
            .create_post(&author, text_post(&format!("post {i}")))
            .await
            .unwrap();
    }

    let first = fx.feed.user_feed(1, 10).await.unwrap();
    let second = fx.feed.user_feed(2, 10).await.unwrap();

    assert_eq!(first.data.len(), 10);
    assert_eq!(second.data.len(), 5);
    assert_eq!(first.pagination.total, 15);
    assert_eq!(first.pagination.total_pages, 2);
    for post in &second.data {
        assert!(first.data.iter().all(|p| p.id != post.id));
    }
}

#[tokio::test]
async fn feed_puts_pinned_posts_first() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let moderator = fx.member("mod", Role::Moderator).await;

    let oldest = fx.service.create_post(&author, text_post("oldest")).await.unwrap();
    fx.service.create_post(&author, text_post("middle")).await.unwrap();
    fx.service.create_post(&author, text_post("newest")).await.unwrap();
    fx.service.toggle_pin(&moderator, oldest.id).await.unwrap();

    let page = fx.feed.user_feed(1, 10).await.unwrap();

    assert_eq!(page.data[0].id, oldest.id);
    assert_eq!(page.data[0].content, "oldest");
}

#[tokio::test]
async fn feed_drops_posts_of_deleted_authors_after_slicing() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let ghost = fx.user("ghost").await;

    fx.service.create_post(&author, text_post("kept")).await.unwrap();
    fx.service.create_post(&ghost, text_post("orphaned")).await.unwrap();
    fx.users.delete(ghost.id).await.unwrap();

    let page = fx.feed.user_feed(1, 10).await.unwrap();

    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].content, "kept");
    // Total still counts the orphaned post; the short page is part of the
    // reproduced contract.
    assert_eq!(page.pagination.total, 2);
}

#[tokio::test]
async fn list_posts_keeps_orphaned_posts_with_null_author() {
    let fx = Fixture::new();
    let ghost = fx.user("ghost").await;

    fx.service.create_post(&ghost, text_post("orphaned")).await.unwrap();
    fx.users.delete(ghost.id).await.unwrap();

    let posts = fx.feed.list_posts().await.unwrap();

    assert_eq!(posts.len(), 1);
    assert!(posts[0].author.is_none());
}

#[tokio::test]
async fn search_requires_a_query() {
    let fx = Fixture::new();

    let result = fx.search.search_all("  ", None).await;

    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn search_scopes_users_and_posts() {
    let fx = Fixture::new();
    let author = fx.member("hellouser", Role::User).await;
    fx.service.create_post(&author, text_post("hello world")).await.unwrap();

    let posts_only = fx
        .search
        .search_all("hello", Some(SearchScope::Posts))
        .await
        .unwrap();
    assert!(posts_only.users.is_empty());
    assert_eq!(posts_only.posts.len(), 1);
    assert_eq!(posts_only.posts[0].content, "hello world");

    let users_only = fx
        .search
        .search_all("hello", Some(SearchScope::Users))
        .await
        .unwrap();
    assert_eq!(users_only.users.len(), 1);
    assert!(users_only.posts.is_empty());

    let both = fx.search.search_all("hello", None).await.unwrap();
    assert_eq!(both.users.len(), 1);
    assert_eq!(both.posts.len(), 1);
}

#[tokio::test]
async fn concurrent_likes_by_different_users_are_not_lost() {
    let fx = Fixture::new();
    let author = fx.user("anna").await;
    let created = fx.service.create_post(&author, text_post("hello")).await.unwrap();

    let mut tasks = Vec::new();
    for i in 0..8 {
        let posts = fx.posts.clone();
        let user = Uuid::from_u128(i as u128 + 1);
        let post_id = created.id;
        tasks.push(tokio::spawn(async move {
            posts.toggle_like(post_id, user).await.unwrap();
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let post = fx.posts.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(post.likes.len(), 8);
}

#[cfg(feature = "postgres")]
mod postgres {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use publica_core::domain::Post;
    use publica_core::ports::{PostRepository, UserRepository};

    use crate::database::entity::{post, user};
    use crate::database::postgres::{PostgresPostRepository, PostgresUserRepository};

    fn post_model(content: &str) -> post::Model {
        let now = Utc::now();
        post::Model {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            content: content.to_owned(),
            image: None,
            mood: None,
            target_user_id: None,
            likes: serde_json::json!([]),
            comments: serde_json::json!([]),
            comments_disabled: false,
            pinned: false,
            pinned_by: None,
            pinned_at: None,
            created_at: now.into(),
            updated_at: now.into(),
            revision: 0,
        }
    }

    #[tokio::test]
    async fn find_post_by_id_maps_json_columns() {
        let model = post_model("Hola!");
        let post_id = model.id;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![model]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let found: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let found = found.unwrap();
        assert_eq!(found.id, post_id);
        assert_eq!(found.content, "Hola!");
        assert!(found.likes.is_empty());
        assert!(found.comments.is_empty());
    }

    #[tokio::test]
    async fn find_user_by_email() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![user::Model {
                id: user_id,
                username: "anna".to_owned(),
                email: "anna@lapublica.cat".to_owned(),
                password_hash: "hash".to_owned(),
                first_name: "Anna".to_owned(),
                last_name: "Serra".to_owned(),
                profile_picture: None,
                role: "moderator".to_owned(),
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);
        let found = repo.find_by_email("anna@lapublica.cat").await.unwrap();

        let found = found.unwrap();
        assert_eq!(found.id, user_id);
        assert_eq!(found.role, publica_core::domain::Role::Moderator);
    }

    // Text search must stay case-insensitive like the in-memory backend.
    #[test]
    fn search_filter_generates_ilike() {
        use sea_orm::{EntityTrait, QueryFilter, QueryTrait};

        use crate::database::postgres::contains_ci;

        let sql = post::Entity::find()
            .filter(contains_ci(post::Column::Content, "Bona"))
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains("ILIKE"));
        assert!(sql.contains("%Bona%"));
    }

    #[tokio::test]
    async fn summaries_of_no_ids_skips_the_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let repo = PostgresUserRepository::new(db);
        let map = repo.summaries(&[]).await.unwrap();

        assert!(map.is_empty());
    }
}
