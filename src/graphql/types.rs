use async_graphql::*;

use crate::db::format_timestamp;
use crate::db::models::{CommentRecord, PostRecord, UserRecord};
use crate::feed::PostId;
use crate::graphql::error::{ApiError, ResultExt};
use crate::graphql::{feed_repo, viewer};

/// A registered account
#[derive(Clone, Debug, SimpleObject)]
pub struct User {
    /// Unique user identifier
    pub id: ID,

    /// Unique login name
    pub username: String,

    /// Display name
    pub name: String,
}

impl From<UserRecord> for User {
    fn from(user: UserRecord) -> Self {
        Self {
            id: ID(user.id),
            username: user.username,
            name: user.name,
        }
    }
}

/// A post in the feed, or a repost of another post
#[derive(Clone, Debug, SimpleObject)]
#[graphql(complex)]
pub struct Post {
    /// Unique post identifier
    pub id: ID,

    /// Text body, absent on reposts and image-only posts
    pub text: Option<String>,

    /// Image reference, if any
    pub image_url: Option<String>,

    /// Creation time, RFC 3339 in UTC
    pub created_at: String,

    #[graphql(skip)]
    pub author_id: String,

    #[graphql(skip)]
    pub repost_of_id: Option<String>,
}

impl From<PostRecord> for Post {
    fn from(post: PostRecord) -> Self {
        Self {
            id: ID(post.id),
            text: post.text,
            image_url: post.image_url,
            created_at: format_timestamp(post.created_at),
            author_id: post.author_id,
            repost_of_id: post.repost_of,
        }
    }
}

#[ComplexObject]
impl Post {
    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        let repo = feed_repo(ctx)?;
        match repo.find_user_by_id(&self.author_id).await.or_api_error()? {
            Some(user) => Ok(user.into()),
            None => {
                tracing::error!(post_id = %self.id.as_str(), author_id = %self.author_id, "Post author missing");
                Err(ApiError::Internal.extend())
            }
        }
    }

    /// The original post when this is a repost
    async fn repost_of(&self, ctx: &Context<'_>) -> Result<Option<Post>> {
        let Some(original) = self.repost_of_id.as_deref().and_then(PostId::parse) else {
            return Ok(None);
        };
        let repo = feed_repo(ctx)?;
        Ok(repo.find_post(&original).await.or_api_error()?.map(Post::from))
    }

    /// Number of users currently liking this post
    async fn like_count(&self, ctx: &Context<'_>) -> Result<i64> {
        feed_repo(ctx)?.count_likes(&self.id).await.or_api_error()
    }

    async fn comment_count(&self, ctx: &Context<'_>) -> Result<i64> {
        feed_repo(ctx)?.count_comments(&self.id).await.or_api_error()
    }

    /// Whether the caller likes this post. Always false for anonymous callers.
    async fn liked_by_me(&self, ctx: &Context<'_>) -> Result<bool> {
        let Some(identity) = viewer(ctx) else {
            return Ok(false);
        };
        feed_repo(ctx)?
            .has_liked(&self.id, &identity.user_id)
            .await
            .or_api_error()
    }

    /// Comments on this post, oldest first
    async fn comments(&self, ctx: &Context<'_>) -> Result<Vec<Comment>> {
        let comments = feed_repo(ctx)?
            .list_comments(&self.id)
            .await
            .or_api_error()?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }
}

/// A comment on a post
#[derive(Clone, Debug, SimpleObject)]
#[graphql(complex)]
pub struct Comment {
    /// Unique comment identifier
    pub id: ID,

    pub text: String,

    /// Creation time, RFC 3339 in UTC
    pub created_at: String,

    #[graphql(skip)]
    pub post_id: String,

    #[graphql(skip)]
    pub author_id: String,
}

impl From<CommentRecord> for Comment {
    fn from(comment: CommentRecord) -> Self {
        Self {
            id: ID(comment.id),
            text: comment.text,
            created_at: format_timestamp(comment.created_at),
            post_id: comment.post_id,
            author_id: comment.author_id,
        }
    }
}

#[ComplexObject]
impl Comment {
    async fn author(&self, ctx: &Context<'_>) -> Result<User> {
        let repo = feed_repo(ctx)?;
        match repo.find_user_by_id(&self.author_id).await.or_api_error()? {
            Some(user) => Ok(user.into()),
            None => {
                tracing::error!(
                    comment_id = %self.id.as_str(),
                    author_id = %self.author_id,
                    "Comment author missing"
                );
                Err(ApiError::Internal.extend())
            }
        }
    }

    async fn post(&self, ctx: &Context<'_>) -> Result<Post> {
        let repo = feed_repo(ctx)?;
        let post = match PostId::parse(&self.post_id) {
            Some(id) => repo.find_post(&id).await.or_api_error()?,
            None => None,
        };
        post.map(Post::from).ok_or_else(|| {
            tracing::error!(comment_id = %self.id.as_str(), post_id = %self.post_id, "Comment post missing");
            ApiError::Internal.extend()
        })
    }
}
