//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{Comment, MAX_CONTENT_LEN, Mood, Post};
pub use user::{Principal, Role, User, UserSummary};
