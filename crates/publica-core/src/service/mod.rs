//! Application services - the business rules of the post feed.

mod feed;
mod posts;
mod search;
mod view;

pub use feed::{DEFAULT_PAGE_LIMIT, FeedPage, FeedQuery, Pagination};
pub use posts::{NewPost, PostService};
pub use search::{SearchResults, SearchScope, SearchService};
pub use view::{CommentView, PostView};
