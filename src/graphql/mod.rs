pub mod error;
pub mod mutations;
pub mod queries;
pub mod schema;
pub mod types;

use async_graphql::Context;

use crate::auth::{Authentication, Identity};
use crate::feed::DynFeedRepository;

pub use error::ApiError;
pub use schema::{build_schema, FeedSchema};

/// The repository registered on the schema.
pub(crate) fn feed_repo<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a DynFeedRepository> {
    ctx.data::<DynFeedRepository>()
}

/// Identity of the caller, if the request carried a valid token.
pub(crate) fn viewer<'a>(ctx: &Context<'a>) -> Option<&'a Identity> {
    ctx.data_opt::<Authentication>()
        .and_then(Authentication::identity)
}
