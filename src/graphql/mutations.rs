use async_graphql::*;

use crate::db::models::{PostRecord, UserRecord};
use crate::feed::{NewComment, NewPost, PostId};
use crate::graphql::error::{ApiError, ResultExt};
use crate::graphql::types::{Comment, Post};
use crate::graphql::{feed_repo, viewer};

// Resolve the caller to a stored user. Tokens for deleted or unknown
// subjects count as unauthenticated.
async fn require_user(ctx: &Context<'_>) -> Result<UserRecord> {
    let identity = viewer(ctx).ok_or_else(|| ApiError::Unauthorized.extend())?;
    feed_repo(ctx)?
        .find_user_by_id(&identity.user_id)
        .await
        .or_api_error()?
        .ok_or_else(|| ApiError::Unauthorized.extend())
}

// Look up the post a mutation targets; malformed and unknown ids are both NotFound
async fn target_post(ctx: &Context<'_>, raw_id: &str) -> Result<(PostId, PostRecord)> {
    let id = PostId::parse(raw_id).ok_or_else(|| ApiError::PostNotFound.extend())?;
    let post = feed_repo(ctx)?
        .find_post(&id)
        .await
        .or_api_error()?
        .ok_or_else(|| ApiError::PostNotFound.extend())?;
    Ok((id, post))
}

/// GraphQL Mutation root
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Publish a post. Needs text, an image, or both.
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        text: Option<String>,
        image_url: Option<String>,
    ) -> Result<Post> {
        let user = require_user(ctx).await?;
        let new_post = NewPost::original(&user.id, text, image_url).or_api_error()?;

        let post = feed_repo(ctx)?
            .create_post(&new_post)
            .await
            .or_api_error()?;
        tracing::info!(post_id = %post.id, author = %user.username, "Created post");
        Ok(post.into())
    }

    /// Like a post. Liking twice is a no-op.
    async fn like_post(&self, ctx: &Context<'_>, post_id: ID) -> Result<Post> {
        let user = require_user(ctx).await?;
        let (id, post) = target_post(ctx, &post_id).await?;

        let inserted = feed_repo(ctx)?
            .like_post(&id, &user.id)
            .await
            .or_api_error()?;
        if !inserted {
            tracing::debug!(post_id = %id, user = %user.username, "Post already liked");
        }
        Ok(post.into())
    }

    /// Remove the caller's like. Succeeds when there was none.
    async fn unlike_post(&self, ctx: &Context<'_>, post_id: ID) -> Result<Post> {
        let user = require_user(ctx).await?;
        let (id, post) = target_post(ctx, &post_id).await?;

        feed_repo(ctx)?
            .unlike_post(&id, &user.id)
            .await
            .or_api_error()?;
        Ok(post.into())
    }

    /// Comment on a post
    async fn comment_on_post(
        &self,
        ctx: &Context<'_>,
        post_id: ID,
        text: String,
    ) -> Result<Comment> {
        let user = require_user(ctx).await?;
        let (id, _) = target_post(ctx, &post_id).await?;
        let new_comment = NewComment::new(id, &user.id, text).or_api_error()?;

        let comment = feed_repo(ctx)?
            .create_comment(&new_comment)
            .await
            .or_api_error()?;
        tracing::info!(comment_id = %comment.id, post_id = %comment.post_id, "Created comment");
        Ok(comment.into())
    }

    /// Repost a post. The repost has no content of its own.
    async fn repost_post(&self, ctx: &Context<'_>, post_id: ID) -> Result<Post> {
        let user = require_user(ctx).await?;
        let (id, _) = target_post(ctx, &post_id).await?;

        let repost = feed_repo(ctx)?
            .create_post(&NewPost::repost(&user.id, id))
            .await
            .or_api_error()?;
        tracing::info!(post_id = %repost.id, author = %user.username, "Created repost");
        Ok(repost.into())
    }
}
