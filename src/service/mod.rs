pub mod comments;
pub mod posts;

pub use comments::{CommentError, CommentWriter};
pub use posts::{PostError, PostsService};
