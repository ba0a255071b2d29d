pub mod domain;
pub mod repository;

pub use domain::{NewComment, NewPost, NewUser, PostId, ValidationError};
pub use repository::{DynFeedRepository, FeedRepository, RepositoryError, SqliteFeedRepository};
