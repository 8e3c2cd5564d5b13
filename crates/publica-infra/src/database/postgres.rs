//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use uuid::Uuid;

use publica_core::domain::{Comment, MAX_CONTENT_LEN, Post, User, UserSummary};
use publica_core::error::RepoError;
use publica_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

/// Retries for the revision-checked post updates before giving up.
const MAX_CONFLICT_RETRIES: usize = 3;

fn query_err(e: sea_orm::DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

/// Case-insensitive substring match (ILIKE), matching what the in-memory
/// repositories do with `to_lowercase().contains(..)`.
pub(crate) fn contains_ci<C: ColumnTrait>(col: C, query: &str) -> SimpleExpr {
    Expr::col(col).ilike(format!("%{query}%"))
}

fn check_content_len(content: &str) -> Result<(), RepoError> {
    if content.chars().count() > MAX_CONTENT_LEN {
        return Err(RepoError::Constraint(format!(
            "content exceeds {MAX_CONTENT_LEN} characters"
        )));
    }
    Ok(())
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let exists = UserEntity::find_by_id(entity.id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .is_some();

        let active: user::ActiveModel = entity.into();
        let model = if exists {
            active.update(&self.db).await
        } else {
            active.insert(&self.db).await
        }
        .map_err(|e| {
            let err_str = e.to_string();
            if err_str.contains("duplicate") || err_str.contains("unique") {
                RepoError::Constraint("account already exists".to_string())
            } else {
                RepoError::Query(err_str)
            }
        })?;

        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn summaries(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|m| {
                let u: User = m.into();
                (u.id, u.summary())
            })
            .collect())
    }

    async fn search(&self, query: &str) -> Result<Vec<UserSummary>, RepoError> {
        let rows = UserEntity::find()
            .filter(
                Condition::any()
                    .add(contains_ci(user::Column::Username, query))
                    .add(contains_ci(user::Column::FirstName, query))
                    .add(contains_ci(user::Column::LastName, query)),
            )
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(rows
            .into_iter()
            .map(|m| {
                let u: User = m.into();
                u.summary()
            })
            .collect())
    }
}

/// PostgreSQL post repository.
///
/// The `likes`/`comments`/pin mutations run a revision-checked update in a
/// retry loop, so two concurrent writers on the same post cannot lose each
/// other's change.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    async fn mutate<F>(&self, id: Uuid, apply: F) -> Result<Option<Post>, RepoError>
    where
        F: Fn(&mut Post) + Send + Sync,
    {
        for _ in 0..MAX_CONFLICT_RETRIES {
            let Some(model) = PostEntity::find_by_id(id)
                .one(&self.db)
                .await
                .map_err(query_err)?
            else {
                return Ok(None);
            };

            let revision = model.revision;
            let mut updated: Post = model.into();
            apply(&mut updated);
            updated.updated_at = Utc::now();

            let mut active = post::ActiveModel::from_domain(updated.clone(), revision + 1);
            // Immutable columns stay untouched.
            active.id = NotSet;
            active.author_id = NotSet;
            active.created_at = NotSet;

            let result = PostEntity::update_many()
                .set(active)
                .filter(post::Column::Id.eq(id))
                .filter(post::Column::Revision.eq(revision))
                .exec(&self.db)
                .await
                .map_err(query_err)?;

            if result.rows_affected > 0 {
                return Ok(Some(updated));
            }

            tracing::debug!(post_id = %id, "post revision conflict, retrying");
        }

        Err(RepoError::Query(
            "post update contention: retries exhausted".to_string(),
        ))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        check_content_len(&entity.content)?;

        let active = post::ActiveModel::from_domain(entity, 0);
        let model = active.insert(&self.db).await.map_err(query_err)?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;
        Ok(result.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn page(&self, page: u64, limit: u64) -> Result<(Vec<Post>, u64), RepoError> {
        let total = PostEntity::find()
            .count(&self.db)
            .await
            .map_err(query_err)?;

        let rows = PostEntity::find()
            .order_by_desc(post::Column::Pinned)
            .order_by_desc(post::Column::CreatedAt)
            .offset(page.saturating_sub(1).saturating_mul(limit))
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn update_content(&self, id: Uuid, content: String) -> Result<Option<Post>, RepoError> {
        check_content_len(&content)?;
        self.mutate(id, move |p| p.content = content.clone()).await
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<Option<Post>, RepoError> {
        self.mutate(id, move |p| {
            if let Some(pos) = p.likes.iter().position(|&u| u == user_id) {
                p.likes.swap_remove(pos);
            } else {
                p.likes.push(user_id);
            }
        })
        .await
    }

    async fn push_comment(&self, id: Uuid, comment: Comment) -> Result<Option<Post>, RepoError> {
        self.mutate(id, move |p| p.comments.push(comment.clone()))
            .await
    }

    async fn set_comments_disabled(
        &self,
        id: Uuid,
        disabled: bool,
    ) -> Result<Option<Post>, RepoError> {
        self.mutate(id, move |p| p.comments_disabled = disabled)
            .await
    }

    async fn set_pin(
        &self,
        id: Uuid,
        pin: Option<(Uuid, DateTime<Utc>)>,
    ) -> Result<Option<Post>, RepoError> {
        self.mutate(id, move |p| match pin {
            Some((by, at)) => {
                p.pinned = true;
                p.pinned_by = Some(by);
                p.pinned_at = Some(at);
            }
            None => {
                p.pinned = false;
                p.pinned_by = None;
                p.pinned_at = None;
            }
        })
        .await
    }

    async fn search(&self, query: &str) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(contains_ci(post::Column::Content, query))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
