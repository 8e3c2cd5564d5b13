//! Post entity for SeaORM.
//!
//! The embedded collections (`likes`, `comments`) and the `mood` tag are
//! stored as JSON columns; `revision` is the optimistic-concurrency counter
//! checked by every array mutation.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use publica_core::domain::{Comment, Mood, Post};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub image: Option<String>,
    pub mood: Option<Json>,
    pub target_user_id: Option<Uuid>,
    pub likes: Json,
    pub comments: Json,
    pub comments_disabled: bool,
    pub pinned: bool,
    pub pinned_by: Option<Uuid>,
    pub pinned_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub revision: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // No FK in the schema: author references may dangle after an account
    // is deleted and are filtered at read time.
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id"
    )]
    Author,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        let likes: Vec<Uuid> = serde_json::from_value(model.likes).unwrap_or_default();
        let comments: Vec<Comment> = serde_json::from_value(model.comments).unwrap_or_default();
        let mood: Option<Mood> = model.mood.and_then(|v| serde_json::from_value(v).ok());

        Self {
            id: model.id,
            author: model.author_id,
            content: model.content,
            image: model.image,
            mood,
            target_user: model.target_user_id,
            likes,
            comments,
            comments_disabled: model.comments_disabled,
            pinned: model.pinned,
            pinned_by: model.pinned_by,
            pinned_at: model.pinned_at.map(Into::into),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

impl ActiveModel {
    /// Build an ActiveModel from a domain post at an explicit revision.
    pub fn from_domain(post: Post, revision: i64) -> Self {
        let likes = serde_json::to_value(&post.likes).unwrap_or_default();
        let comments = serde_json::to_value(&post.comments).unwrap_or_default();
        let mood = post
            .mood
            .as_ref()
            .and_then(|m| serde_json::to_value(m).ok());

        Self {
            id: Set(post.id),
            author_id: Set(post.author),
            content: Set(post.content),
            image: Set(post.image),
            mood: Set(mood),
            target_user_id: Set(post.target_user),
            likes: Set(likes),
            comments: Set(comments),
            comments_disabled: Set(post.comments_disabled),
            pinned: Set(post.pinned),
            pinned_by: Set(post.pinned_by),
            pinned_at: Set(post.pinned_at.map(Into::into)),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
            revision: Set(revision),
        }
    }
}
