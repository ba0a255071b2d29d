use async_graphql::{EmptySubscription, Schema};

use super::mutations::MutationRoot;
use super::queries::QueryRoot;
use crate::feed::DynFeedRepository;

/// Nesting cap for queries; repost chains resolve one level per `repostOf`.
const MAX_QUERY_DEPTH: usize = 16;

/// GraphQL Schema type
pub type FeedSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the GraphQL schema over a repository.
///
/// The caller's `Authentication` is attached per request.
pub fn build_schema(repo: DynFeedRepository) -> FeedSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(repo)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish()
}
