pub mod comment;
pub mod ids;
pub mod post;

pub use comment::*;
pub use ids::*;
pub use post::*;
