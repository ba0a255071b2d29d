use async_graphql::*;

use crate::feed::PostId;
use crate::graphql::error::ResultExt;
use crate::graphql::feed_repo;
use crate::graphql::types::{Post, User};

/// GraphQL Query root
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All posts, newest first
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let posts = feed_repo(ctx)?.list_posts().await.or_api_error()?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    /// A single post. Null when the id is malformed or unknown.
    async fn post(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Post>> {
        let Some(id) = PostId::parse(&id) else {
            return Ok(None);
        };
        let post = feed_repo(ctx)?.find_post(&id).await.or_api_error()?;
        Ok(post.map(Post::from))
    }

    /// A user by username
    async fn user(&self, ctx: &Context<'_>, username: String) -> Result<Option<User>> {
        let user = feed_repo(ctx)?
            .find_user_by_username(&username)
            .await
            .or_api_error()?;
        Ok(user.map(User::from))
    }

    /// Posts by a user, newest first. Empty when the user does not exist.
    async fn user_posts(&self, ctx: &Context<'_>, username: String) -> Result<Vec<Post>> {
        let repo = feed_repo(ctx)?;
        let Some(user) = repo.find_user_by_username(&username).await.or_api_error()? else {
            return Ok(Vec::new());
        };
        let posts = repo.list_posts_by_author(&user.id).await.or_api_error()?;
        Ok(posts.into_iter().map(Post::from).collect())
    }
}
